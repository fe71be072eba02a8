//! Persistence adapters.

mod credentials_file;

pub use credentials_file::FileCredentialStore;
