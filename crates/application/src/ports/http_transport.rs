//! HTTP transport port
//!
//! Defines the interface for sending one request and receiving one response.
//! The transport knows nothing about credentials or renewal; the API client
//! layers that on top.

use std::future::Future;
use std::pin::Pin;

use groupguard_domain::{ApiRequest, ApiResponse};

/// Errors raised before an HTTP status is available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// DNS resolution failed.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// The host that failed to resolve.
        host: String,
        /// Error message.
        message: String,
    },

    /// The connection was refused.
    #[error("connection refused: {host}:{port}")]
    ConnectionRefused {
        /// The host that refused the connection.
        host: String,
        /// The port that refused the connection.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Too many redirects.
    #[error("too many redirects (max: {max})")]
    TooManyRedirects {
        /// The maximum number of redirects allowed.
        max: u32,
    },

    /// The URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The body could not be encoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Sends requests to the backend.
pub trait HttpTransport: Send + Sync {
    /// Executes one request, relative paths resolved against the configured
    /// base address.
    ///
    /// Any status code, including 4xx and 5xx, is a successful execution.
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + '_>>;
}
