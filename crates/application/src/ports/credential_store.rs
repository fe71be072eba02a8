//! Credential store port
//!
//! Defines the interface for the durable key/value store holding the
//! session credential and the few facts remembered about the account.

use std::collections::BTreeMap;

use async_trait::async_trait;
use groupguard_domain::{BearerToken, CredentialKey, Session};

/// Errors that can occur during credential store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Durable store for session credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reads one value.
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError>;

    /// Writes one value.
    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError>;

    /// Removes one value; removing a missing key is not an error.
    async fn remove(&self, key: CredentialKey) -> Result<(), StoreError>;

    /// Returns every stored entry.
    async fn entries(&self) -> Result<BTreeMap<CredentialKey, String>, StoreError>;

    /// Writes several values.
    ///
    /// Implementations backed by a file should override this to write once.
    async fn set_many(&self, entries: &[(CredentialKey, String)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(*key, value).await?;
        }
        Ok(())
    }

    /// Removes every key.
    async fn clear(&self) -> Result<(), StoreError> {
        for key in CredentialKey::ALL {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// The stored bearer credential, if any.
    async fn token(&self) -> Result<Option<BearerToken>, StoreError> {
        Ok(self
            .get(CredentialKey::Token)
            .await?
            .filter(|t| !t.is_empty())
            .map(BearerToken::new))
    }

    /// Snapshot of the whole session.
    async fn session(&self) -> Result<Session, StoreError> {
        Ok(Session::from_entries(&self.entries().await?))
    }
}
