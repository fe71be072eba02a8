//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Base address used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Configuration passed to the API client at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base address; every request path is resolved against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Push channel address; falls back to `base_url`.
    #[serde(default)]
    pub ws_url: Option<String>,
    /// Whether ambient cookies are kept and sent (needed by `/auth/refresh`).
    #[serde(default = "default_true")]
    pub with_credentials: bool,
    /// Default request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User-Agent header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Credentials file; the platform config directory is used when unset.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    /// Push channel reconnection settings.
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("groupguard/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: None,
            with_credentials: true,
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            credentials_file: None,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Rewrites `https://localhost…` to plain HTTP; local backends don't do TLS.
#[must_use]
pub fn ensure_http_url(url: &str) -> String {
    url.strip_prefix("https://localhost")
        .map_or_else(|| url.to_string(), |rest| format!("http://localhost{rest}"))
}

impl ClientConfig {
    /// Creates a configuration for the given base address.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Applies the localhost rewrite and drops trailing slashes.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.base_url = ensure_http_url(self.base_url.trim_end_matches('/'));
        self.ws_url = self
            .ws_url
            .map(|u| ensure_http_url(u.trim_end_matches('/')));
        self
    }

    /// Validates both addresses.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if an address does not parse or is not HTTP(S).
    pub fn validate(&self) -> DomainResult<()> {
        for raw in std::iter::once(&self.base_url).chain(self.ws_url.as_ref()) {
            let url = Url::parse(raw).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(DomainError::InvalidUrl(format!(
                    "unsupported scheme '{}': {raw}",
                    url.scheme()
                )));
            }
        }
        Ok(())
    }

    /// Push channel address.
    #[must_use]
    pub fn ws_url(&self) -> &str {
        self.ws_url.as_deref().unwrap_or(&self.base_url)
    }

    /// Default timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Absolute URL of an API endpoint.
    #[must_use]
    pub fn api_url(&self, endpoint: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }

    /// Resolves a server-side file path (payment proofs) for display.
    ///
    /// Absolute `http…` references pass through; empty input stays empty.
    #[must_use]
    pub fn file_url(&self, file_path: &str) -> String {
        if file_path.is_empty() || file_path.starts_with("http") {
            return file_path.to_string();
        }
        self.api_url(file_path)
    }
}

/// Reconnection schedule for the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Attempts after the first failure; 0 disables reconnection.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// First delay in milliseconds, doubled on each attempt.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Delay ceiling in milliseconds.
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,
}

const fn default_attempts() -> u32 {
    5
}

const fn default_delay_ms() -> u64 {
    1_000
}

const fn default_delay_max_ms() -> u64 {
    4_000
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
            delay_max_ms: default_delay_max_ms(),
        }
    }
}

impl ReconnectPolicy {
    /// Un-jittered delay before reconnection attempt `attempt` (1-based).
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.delay_ms.saturating_mul(factor).min(self.delay_max_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn https_localhost_is_downgraded() {
        assert_eq!(ensure_http_url("https://localhost:5000"), "http://localhost:5000");
        assert_eq!(ensure_http_url("https://api.example.com"), "https://api.example.com");
    }

    #[test]
    fn normalized_trims_and_rewrites() {
        let config = ClientConfig::new("https://localhost:5000/").normalized();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.ws_url(), "http://localhost:5000");
    }

    #[test]
    fn file_urls_resolve_against_base() {
        let config = ClientConfig::new("http://api.test");
        assert_eq!(config.file_url("/uploads/p.png"), "http://api.test/uploads/p.png");
        assert_eq!(config.file_url("uploads/p.png"), "http://api.test/uploads/p.png");
        assert_eq!(config.file_url("https://cdn.test/p.png"), "https://cdn.test/p.png");
        assert_eq!(config.file_url(""), "");
        assert_eq!(config.api_url("user/profile"), "http://api.test/user/profile");
    }

    #[test]
    fn validate_rejects_non_http() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(ClientConfig::new("ftp://x").validate().is_err());
        assert!(ClientConfig::new("not a url").validate().is_err());
    }

    #[test]
    fn reconnect_delay_doubles_up_to_ceiling() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.base_delay(1), Duration::from_millis(1_000));
        assert_eq!(policy.base_delay(2), Duration::from_millis(2_000));
        assert_eq!(policy.base_delay(3), Duration::from_millis(4_000));
        assert_eq!(policy.base_delay(5), Duration::from_millis(4_000));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "base_url": "http://api.test" }"#).unwrap_or_default();
        assert_eq!(config.base_url, "http://api.test");
        assert!(config.with_credentials);
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.reconnect.attempts, 5);
    }
}
