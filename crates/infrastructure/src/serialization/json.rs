//! JSON helpers.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Same as [`to_json_stable`], as bytes ready for writing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    to_json_stable(value).map(String::into_bytes)
}

/// Deserializes JSON from bytes.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn writes_two_space_indent_and_newline() {
        let map: BTreeMap<&str, &str> = [("token", "abc"), ("role", "admin")].into();
        let json = to_json_stable(&map).unwrap_or_default();
        assert_eq!(json, "{\n  \"role\": \"admin\",\n  \"token\": \"abc\"\n}\n");
    }

    #[test]
    fn empty_map_is_compact() {
        let map: BTreeMap<String, String> = BTreeMap::new();
        assert_eq!(to_json_stable(&map).unwrap_or_default(), "{}\n");
    }

    #[test]
    fn reads_minified_input() {
        let parsed: Result<BTreeMap<String, String>, _> = from_json_bytes(br#"{"name":"Ahmed"}"#);
        assert_eq!(
            parsed.ok().and_then(|m| m.get("name").cloned()),
            Some("Ahmed".to_string())
        );
    }

    #[test]
    fn reports_malformed_input() {
        let parsed: Result<BTreeMap<String, String>, _> = from_json_bytes(b"{not json");
        assert!(matches!(parsed, Err(SerializationError::Deserialize(_))));
    }
}
