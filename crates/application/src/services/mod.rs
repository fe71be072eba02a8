//! Typed wrappers over the backend endpoints.
//!
//! Each service borrows the [`ApiClient`](crate::ApiClient), so every call
//! goes through the same credential handling.

mod admin;
mod user;
mod whatsapp;

pub use admin::AdminApi;
pub use user::UserApi;
pub use whatsapp::WhatsAppApi;

use serde::Deserialize;

/// Encodes one path segment, e.g. a group JID.
pub(crate) fn segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// A list returned either bare or wrapped in `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}
