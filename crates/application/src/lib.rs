//! GroupGuard Application - Use cases and ports
//!
//! This crate contains the authenticated API client with its single-flight
//! credential renewal, the typed endpoint services, the push event hub and
//! the pairing flow. It defines ports (traits) for the HTTP transport, the
//! credential store and navigation, implemented by the infrastructure layer.

pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod ports;
pub mod services;

pub use auth::{MemoryCredentialStore, RenewalCoordinator};
pub use client::{ApiClient, LoginOutcome};
pub use error::{ClientError, ClientResult};
pub use events::{EventHub, EventStream, PairingSession, PairingView};
pub use ports::{CredentialStore, HttpTransport, Navigator, StoreError, TransportError};
pub use services::{AdminApi, UserApi, WhatsAppApi};
