//! Domain error types

use thiserror::Error;

/// Domain-level errors raised by local validation, before any network call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required form field was left empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The e-mail address is malformed.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The phone number is not a supported Yemeni or Saudi number.
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// The password is shorter than the minimum length.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A value could not be parsed into a known variant.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// Field being parsed.
        field: &'static str,
        /// Offending input.
        value: String,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
