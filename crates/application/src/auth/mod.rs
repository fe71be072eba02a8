//! Credential handling.
//!
//! This module provides:
//! - The single-flight renewal coordinator used by the API client
//! - An in-memory credential store

mod memory_store;
mod renewal;

pub use memory_store::MemoryCredentialStore;
pub use renewal::{RenewalCoordinator, RenewalGuard, RenewalTicket};
