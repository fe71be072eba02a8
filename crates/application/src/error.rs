//! Application error types

use groupguard_domain::{ApiResponse, DomainError, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::ports::{StoreError, TransportError};

/// Errors returned by the API client.
///
/// `Clone` because a single renewal failure is delivered to every caller
/// that was queued behind it.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Local validation failed; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(#[from] DomainError),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {code}: {message}", code = .status.as_u16())]
    Http {
        /// Response status.
        status: StatusCode,
        /// Backend error text, or the reason phrase.
        message: String,
        /// Response body, when it was JSON.
        body: Option<Value>,
    },

    /// No response was received.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The credential store failed.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// A 2xx response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The renewal endpoint answered 2xx without a credential.
    #[error("session renewal returned no token")]
    MissingToken,

    /// The renewal in flight was dropped before it settled.
    #[error("session renewal was abandoned")]
    RenewalAbandoned,
}

impl ClientError {
    /// Builds the error for a non-2xx response.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        Self::Http {
            status: response.status,
            message: response
                .error_message()
                .unwrap_or_else(|| response.status.reason_phrase().to_string()),
            body: response.json_value(),
        }
    }

    /// HTTP status, for `Http` errors.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is an HTTP 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status().is_some_and(|s| s.is_unauthorized())
    }

    /// Whether this is an HTTP `code`.
    #[must_use]
    pub fn has_status(&self, code: u16) -> bool {
        self.status().is_some_and(|s| s.as_u16() == code)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn http_error_takes_backend_message() {
        let response = ApiResponse::json(403, &json!({ "message": "Account suspended" }));
        let error = ClientError::from_response(&response);
        assert_eq!(error.to_string(), "HTTP 403: Account suspended");
        assert!(error.has_status(403));
        assert!(!error.is_unauthorized());
    }

    #[test]
    fn http_error_falls_back_to_reason_phrase() {
        let response = ApiResponse::new(502, Default::default(), Vec::new(), Default::default());
        let error = ClientError::from_response(&response);
        assert!(matches!(
            &error,
            ClientError::Http { message, body: None, .. } if message == StatusCode(502).reason_phrase()
        ));
    }
}
