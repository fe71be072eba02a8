//! GroupGuard Domain - Core business types
//!
//! This crate defines the domain model for the GroupGuard client: request
//! and response descriptions, credentials and sessions, backend resources
//! and push events. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod request;
pub mod resources;
pub mod response;

pub use auth::{
    AccountStatus, BearerToken, CredentialKey, Landing, LoginRequest, LoginResponse,
    RegistrationForm, Role, Session,
};
pub use config::{ClientConfig, ReconnectPolicy, ensure_http_url};
pub use error::{DomainError, DomainResult};
pub use events::{EventKind, PushEvent, QrEncoding, SessionState};
pub use request::{ApiRequest, FormPart, HttpMethod, RequestBody};
pub use resources::Ack;
pub use response::{ApiResponse, StatusCode};
