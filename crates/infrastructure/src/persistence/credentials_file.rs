//! File-backed credential store.
//!
//! Credentials live in the platform config directory by default:
//! - Linux: ~/.config/groupguard/credentials.json
//! - macOS: ~/Library/Application Support/groupguard/credentials.json
//! - Windows: %APPDATA%/groupguard/credentials.json

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use groupguard_application::{CredentialStore, StoreError};
use groupguard_domain::CredentialKey;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Current file layout version.
const SCHEMA_VERSION: u32 = 1;

/// On-disk layout:
/// ```json
/// {
///   "schema_version": 1,
///   "credentials": {
///     "name": "Ahmed",
///     "role": "user",
///     "token": "eyJhbGciOi..."
///   }
/// }
/// ```
///
/// Keys this client does not know are kept as they are.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default = "schema_version")]
    schema_version: u32,
    #[serde(default)]
    credentials: BTreeMap<String, String>,
}

const fn schema_version() -> u32 {
    SCHEMA_VERSION
}

impl From<SerializationError> for StoreError {
    fn from(error: SerializationError) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Credential store persisted as a JSON file.
///
/// Every operation reads the file afresh, and writes replace it through a
/// temporary sibling so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates a store at the default location.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the platform has no config directory.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| StoreError::Io("could not determine config directory".to_string()))
    }

    /// Uses `path` when given, the default location otherwise.
    ///
    /// # Errors
    ///
    /// See [`Self::open_default`].
    pub fn open(path: Option<&Path>) -> Result<Self, StoreError> {
        path.map_or_else(Self::open_default, |p| Ok(Self::new(p)))
    }

    /// `<config_dir>/groupguard/credentials.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("groupguard").join("credentials.json"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<CredentialsFile, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(CredentialsFile::default()),
            Ok(bytes) => Ok(from_json_bytes(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CredentialsFile {
                schema_version: SCHEMA_VERSION,
                credentials: BTreeMap::new(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, file: &CredentialsFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, to_json_stable_bytes(file)?).await?;
        restrict_permissions(&tmp).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), entries = file.credentials.len(), "credentials saved");
        Ok(())
    }

    /// Loads, applies `change`, and saves, all under the write lock.
    async fn update<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        change(&mut file.credentials);
        file.schema_version = SCHEMA_VERSION;
        self.save(&file).await
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn key_named(name: &str) -> Option<CredentialKey> {
    CredentialKey::ALL.into_iter().find(|k| k.as_str() == name)
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.credentials.remove(key.as_str()))
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.update(|map| {
            map.insert(key.as_str().to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.update(|map| {
            map.remove(key.as_str());
        })
        .await
    }

    async fn entries(&self) -> Result<BTreeMap<CredentialKey, String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await?
            .credentials
            .into_iter()
            .filter_map(|(name, value)| key_named(&name).map(|key| (key, value)))
            .collect())
    }

    async fn set_many(&self, entries: &[(CredentialKey, String)]) -> Result<(), StoreError> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert(key.as_str().to_string(), value.clone());
            }
        })
        .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.update(|map| {
            for key in CredentialKey::ALL {
                map.remove(key.as_str());
            }
        })
        .await
    }
}
