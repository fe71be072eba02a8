//! In-memory credential store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use groupguard_domain::CredentialKey;
use tokio::sync::RwLock;

use crate::ports::{CredentialStore, StoreError};

/// Thread-safe in-memory credential store.
///
/// Nothing survives the process; used for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<RwLock<BTreeMap<CredentialKey, String>>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `entries`.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = (CredentialKey, String)>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries.into_iter().collect())),
        }
    }

    /// Get count of stored entries.
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.entries.write().await.insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.entries.write().await.remove(&key);
        Ok(())
    }

    async fn entries(&self) -> Result<BTreeMap<CredentialKey, String>, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use groupguard_domain::{BearerToken, Role};

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryCredentialStore::new();
        store.set(CredentialKey::Token, "abc").await.unwrap();

        assert_eq!(
            store.get(CredentialKey::Token).await.unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(
            store.token().await.unwrap(),
            Some(BearerToken::new("abc"))
        );
    }

    #[tokio::test]
    async fn test_empty_token_is_absent() {
        let store = MemoryCredentialStore::with_entries([(CredentialKey::Token, String::new())]);
        assert_eq!(store.token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_snapshot() {
        let store = MemoryCredentialStore::new();
        store
            .set_many(&[
                (CredentialKey::Token, "t".to_string()),
                (CredentialKey::Role, "admin".to_string()),
                (CredentialKey::Name, "Ali".to_string()),
            ])
            .await
            .unwrap();

        let session = store.session().await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.role, Some(Role::Admin));
        assert_eq!(session.name.as_deref(), Some("Ali"));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryCredentialStore::with_entries([
            (CredentialKey::Token, "t".to_string()),
            (CredentialKey::NewUserId, "u".to_string()),
        ]);
        assert_eq!(store.count().await, 2);

        store.clear().await.unwrap();
        assert_eq!(store.count().await, 0);
        assert!(!store.session().await.unwrap().is_authenticated());
    }
}
