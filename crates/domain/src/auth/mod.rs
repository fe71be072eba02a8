//! Authentication domain types

mod registration;
mod types;

pub use registration::{normalize_phone, RegistrationForm, RegistrationPayload, MIN_PASSWORD_LEN};
pub use types::{
    AccountStatus, BearerToken, CredentialKey, Landing, LoginRequest, LoginResponse,
    RefreshResponse, RegisterResponse, RegisteredUser, Role, Session, UserSummary,
};
