//! Request specification type
//!
//! An `ApiRequest` is everything needed to issue, and later replay, one call
//! against the backend: method, path relative to the configured base
//! address, query pairs, headers, body and the one-shot retry marker used by
//! credential renewal.

use serde::Serialize;

use super::{HttpMethod, RequestBody};

/// Header carrying the bearer credential.
pub const AUTHORIZATION: &str = "Authorization";

/// Login endpoint, exempt from renewal.
pub const LOGIN_PATH: &str = "/auth/login";
/// Registration endpoint, exempt from renewal.
pub const REGISTER_PATH: &str = "/auth/register";
/// Credential renewal endpoint, exempt from renewal.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// A single call against the backend API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the base address, e.g. `/user/profile`.
    pub path: String,
    /// Query string pairs, encoded by the transport.
    pub query: Vec<(String, String)>,
    /// Request headers, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: RequestBody,
    /// Per-request timeout override in milliseconds.
    pub timeout_ms: Option<u64>,
    retried: bool,
}

impl ApiRequest {
    /// Creates a request with no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            method,
            path,
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            timeout_ms: None,
            retried: false,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Serializes `value` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, serde_json::Error> {
        Ok(self.with_body(RequestBody::json(value)?))
    }

    /// Appends a query pair.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a header, replacing any existing header of the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Sets a header in place, replacing any existing header of the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Looks a header up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the caller already supplied an `Authorization` header.
    #[must_use]
    pub fn has_authorization(&self) -> bool {
        self.header(AUTHORIZATION).is_some()
    }

    /// Whether this call targets login, registration or renewal.
    ///
    /// These routes never go through credential renewal; a 401 there means
    /// the credentials themselves are wrong.
    #[must_use]
    pub fn is_auth_route(&self) -> bool {
        let path = self.path.to_ascii_lowercase();
        [LOGIN_PATH, REGISTER_PATH, REFRESH_PATH]
            .iter()
            .any(|route| path.contains(route))
    }

    /// Whether this request was already replayed after a renewal.
    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.retried
    }

    /// Marks the request as replayed; a second 401 then fails immediately.
    pub const fn mark_retried(&mut self) {
        self.retried = true;
    }
}
