//! GroupGuard Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in the
//! application layer: the reqwest HTTP transport, the file-backed credential
//! store, the socket.io push channel and configuration loading.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod push;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use crate::config::{ConfigError, ConfigLoader, load_config};
pub use persistence::FileCredentialStore;
pub use push::{PushChannel, PushError, PushHandle, QrImage, QrImageError};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
