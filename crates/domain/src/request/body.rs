//! HTTP Request body types

use serde::Serialize;
use serde_json::Value;

/// Content of a single multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Plain text field.
    Text(String),
    /// Uploaded file (payment proofs).
    File {
        /// File name sent in the part's content disposition.
        file_name: String,
        /// Explicit content type; guessed from the file name when absent.
        content_type: Option<String>,
        /// Raw file bytes.
        bytes: Vec<u8>,
    },
}

/// One named multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    /// Field name.
    pub name: String,
    /// Field content.
    pub value: FormValue,
}

impl FormPart {
    /// Creates a text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    /// Creates a file field.
    #[must_use]
    pub fn file(name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                content_type: None,
                bytes,
            },
        }
    }
}

/// HTTP request body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON document
    Json(Value),
    /// Multipart form data
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    /// Serializes a value into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// An empty JSON object, which the backend expects on action endpoints.
    #[must_use]
    pub fn empty_object() -> Self {
        Self::Json(Value::Object(serde_json::Map::new()))
    }

    /// Returns whether there is no body at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the content type for JSON bodies.
    ///
    /// Multipart bodies carry a boundary chosen by the transport, so no
    /// static value is returned for them.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Json(_) => Some("application/json"),
            Self::Empty | Self::Multipart(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_has_content_type() {
        let body = RequestBody::json(&json!({ "jid": "123@g.us" })).unwrap_or_default();
        assert_eq!(body.content_type(), Some("application/json"));
        assert!(!body.is_empty());
    }

    #[test]
    fn empty_object_is_not_empty_body() {
        let body = RequestBody::empty_object();
        assert_eq!(body, RequestBody::Json(json!({})));
        assert!(RequestBody::Empty.is_empty());
    }

    #[test]
    fn multipart_leaves_content_type_to_transport() {
        let body = RequestBody::Multipart(vec![
            FormPart::text("amount", "100"),
            FormPart::file("invoice", "proof.png", vec![1, 2, 3]),
        ]);
        assert_eq!(body.content_type(), None);
    }
}
