//! Deterministic JSON for files kept on disk.
//!
//! Output is pretty-printed with 2-space indentation and a trailing newline,
//! with object keys in the order of the source map.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
