//! Client configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `<config_dir>/groupguard/config.{toml,yaml}`
//! 3. `groupguard.{toml,yaml}` in the working directory
//! 4. an explicit file, which must exist
//! 5. `GROUPGUARD_*` environment variables; nested keys use `__`, as in
//!    `GROUPGUARD_RECONNECT__ATTEMPTS=3`

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, Map};
use groupguard_domain::{ClientConfig, DomainError};
use tracing::debug;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "GROUPGUARD";

/// Base name of the configuration file.
pub const CONFIG_BASENAME: &str = "groupguard";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the schema.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The merged configuration is invalid.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    search_dirs: bool,
    env_prefix: String,
    env_vars: Option<Map<String, String>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            file: None,
            search_dirs: true,
            env_prefix: ENV_PREFIX.to_string(),
            env_vars: None,
        }
    }
}

impl ConfigLoader {
    /// A loader with every source enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an explicit configuration file.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Skips the user and working-directory files.
    #[must_use]
    pub const fn without_search(mut self) -> Self {
        self.search_dirs = false;
        self
    }

    /// Uses another environment prefix.
    #[must_use]
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Reads variables from `vars` instead of the process environment.
    #[must_use]
    pub fn env_vars(mut self, vars: Map<String, String>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Merges every source, normalizes addresses and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `Load` when a source is unreadable or malformed and `Invalid`
    /// when an address is unusable.
    pub fn load(self) -> Result<ClientConfig, ConfigError> {
        let mut builder = Config::builder();

        if self.search_dirs {
            if let Some(dir) = dirs::config_dir() {
                builder = builder
                    .add_source(File::from(dir.join(CONFIG_BASENAME).join("config")).required(false));
            }
            builder = builder.add_source(File::with_name(CONFIG_BASENAME).required(false));
        }

        if let Some(path) = &self.file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(self.env_vars),
        );

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        let config = config.normalized();
        config.validate()?;

        debug!(base_url = %config.base_url, ws_url = %config.ws_url(), "configuration loaded");
        Ok(config)
    }
}

/// Loads configuration from the standard sources plus an optional file.
///
/// # Errors
///
/// See [`ConfigLoader::load`].
pub fn load_config(file: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let loader = ConfigLoader::new();
    match file {
        Some(path) => loader.file(path).load(),
        None => loader.load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn isolated() -> ConfigLoader {
        ConfigLoader::new().without_search().env_vars(Map::new())
    }

    #[test]
    fn defaults_without_sources() {
        let config = isolated().load().unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn reads_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("groupguard.toml");
        std::fs::write(
            &path,
            "base_url = \"https://localhost:5000/\"\ntimeout_ms = 5000\n\n[reconnect]\nattempts = 2\n",
        )
        .unwrap();

        let config = isolated().file(&path).load().unwrap();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.reconnect.attempts, 2);
        assert_eq!(config.reconnect.delay_ms, 1_000);
    }

    #[test]
    fn reads_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("groupguard.yaml");
        std::fs::write(&path, "base_url: http://api.test\nwith_credentials: false\n").unwrap();

        let config = isolated().file(&path).load().unwrap();
        assert_eq!(config.base_url, "http://api.test");
        assert!(!config.with_credentials);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("groupguard.toml");
        std::fs::write(&path, "base_url = \"http://file.test\"\n").unwrap();

        let vars: Map<String, String> = [
            ("GROUPGUARD_BASE_URL", "http://env.test"),
            ("GROUPGUARD_WS_URL", "http://push.test"),
            ("GROUPGUARD_RECONNECT__ATTEMPTS", "7"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = isolated().file(&path).env_vars(vars).load().unwrap();
        assert_eq!(config.base_url, "http://env.test");
        assert_eq!(config.ws_url(), "http://push.test");
        assert_eq!(config.reconnect.attempts, 7);
    }

    #[test]
    fn missing_explicit_file_fails() {
        let result = isolated().file("/nonexistent/groupguard.toml").load();
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn invalid_address_fails_validation() {
        let vars: Map<String, String> =
            [("GROUPGUARD_BASE_URL".to_string(), "ftp://x".to_string())].into();
        let result = isolated().env_vars(vars).load();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
