//! Engine.io v4 / socket.io v4 text frame codec.
//!
//! Only the subset a websocket-only client needs is decoded: the engine.io
//! handshake, heartbeat and close packets, and socket.io connect, disconnect,
//! event and connect-error packets. Binary events are reported as
//! unsupported.

use serde::Deserialize;
use serde_json::Value;

/// Engine.io pong, sent in answer to every ping.
pub const PONG: &str = "3";

/// Socket.io disconnect from the default namespace.
pub const DISCONNECT: &str = "41";

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Zero-length frame.
    #[error("empty frame")]
    Empty,

    /// Unknown engine.io or socket.io packet type.
    #[error("unknown packet type '{0}'")]
    UnknownPacket(char),

    /// Payload is not the JSON the packet type requires.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Event packet without a name.
    #[error("event packet has no name")]
    MissingEventName,
}

/// Engine.io handshake data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine session id.
    pub sid: String,
    /// Server ping interval in milliseconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    /// Grace period after a missed ping, in milliseconds.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
}

const fn default_ping_interval() -> u64 {
    25_000
}

const fn default_ping_timeout() -> u64 {
    20_000
}

impl Handshake {
    /// Longest silence before the connection counts as dead.
    #[must_use]
    pub const fn heartbeat_ms(&self) -> u64 {
        self.ping_interval.saturating_add(self.ping_timeout)
    }
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Engine.io `0`.
    Open(Handshake),
    /// Engine.io `1`.
    Close,
    /// Engine.io `2`.
    Ping,
    /// Engine.io `3`.
    Pong,
    /// Engine.io `6`.
    Noop,
    /// Socket.io `0`: namespace joined.
    Connect {
        /// Namespace, `/` by default.
        namespace: String,
    },
    /// Socket.io `1`: namespace left, server side.
    Disconnect {
        /// Namespace.
        namespace: String,
    },
    /// Socket.io `2`: named event.
    Event {
        /// Namespace.
        namespace: String,
        /// Acknowledgement id the server asked for.
        ack_id: Option<u64>,
        /// Event name.
        name: String,
        /// Event arguments after the name.
        args: Vec<Value>,
    },
    /// Socket.io `4`: namespace join refused.
    ConnectError {
        /// Namespace.
        namespace: String,
        /// Refusal text.
        message: String,
    },
    /// Socket.io ack or binary packets, which this client never requests.
    Unsupported(char),
}

/// Decodes one websocket text frame.
///
/// # Errors
///
/// Returns an error for empty frames, unknown packet types and malformed
/// payloads.
pub fn decode(text: &str) -> Result<Frame, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let rest = chars.as_str();

    match kind {
        '0' => serde_json::from_str(rest)
            .map(Frame::Open)
            .map_err(|e| FrameError::InvalidPayload(e.to_string())),
        '1' => Ok(Frame::Close),
        '2' => Ok(Frame::Ping),
        '3' => Ok(Frame::Pong),
        '4' => decode_packet(rest),
        '6' => Ok(Frame::Noop),
        other => Err(FrameError::UnknownPacket(other)),
    }
}

/// Decodes the socket.io packet carried by an engine.io message.
fn decode_packet(text: &str) -> Result<Frame, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let (namespace, rest) = split_namespace(chars.as_str());

    match kind {
        '0' => Ok(Frame::Connect { namespace }),
        '1' => Ok(Frame::Disconnect { namespace }),
        '2' => {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            let (id, payload) = rest.split_at(digits);
            let ack_id = id.parse().ok();

            let mut items: Vec<Value> = serde_json::from_str(payload)
                .map_err(|e| FrameError::InvalidPayload(e.to_string()))?;
            if items.is_empty() {
                return Err(FrameError::MissingEventName);
            }
            let Value::String(name) = items.remove(0) else {
                return Err(FrameError::MissingEventName);
            };
            Ok(Frame::Event {
                namespace,
                ack_id,
                name,
                args: items,
            })
        }
        '4' => {
            let message = match serde_json::from_str::<Value>(rest) {
                Ok(Value::String(s)) => s,
                Ok(value) => value
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| value.to_string(), str::to_string),
                Err(_) => rest.to_string(),
            };
            Ok(Frame::ConnectError { namespace, message })
        }
        '3' | '5' | '6' => Ok(Frame::Unsupported(kind)),
        other => Err(FrameError::UnknownPacket(other)),
    }
}

/// Splits an optional `/nsp,` prefix off a socket.io packet body.
fn split_namespace(text: &str) -> (String, &str) {
    if text.starts_with('/') {
        match text.split_once(',') {
            Some((namespace, rest)) => (namespace.to_string(), rest),
            None => (text.to_string(), ""),
        }
    } else {
        ("/".to_string(), text)
    }
}

/// Encodes a namespace connect packet carrying `auth`.
#[must_use]
pub fn encode_connect(namespace: &str, auth: &Value) -> String {
    if namespace == "/" || namespace.is_empty() {
        format!("40{auth}")
    } else {
        format!("40{namespace},{auth}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_handshake() {
        let frame = decode(r#"0{"sid":"abc","upgrades":[],"pingInterval":300,"pingTimeout":200,"maxPayload":1000000}"#);
        let Ok(Frame::Open(handshake)) = frame else {
            panic!("expected open, got {frame:?}");
        };
        assert_eq!(handshake.sid, "abc");
        assert_eq!(handshake.heartbeat_ms(), 500);
    }

    #[test]
    fn decodes_heartbeat_and_close() {
        assert_eq!(decode("2"), Ok(Frame::Ping));
        assert_eq!(decode("3"), Ok(Frame::Pong));
        assert_eq!(decode("1"), Ok(Frame::Close));
        assert_eq!(decode("6"), Ok(Frame::Noop));
        assert_eq!(decode(""), Err(FrameError::Empty));
        assert_eq!(decode("9"), Err(FrameError::UnknownPacket('9')));
    }

    #[test]
    fn decodes_connect_ack() {
        assert_eq!(
            decode(r#"40{"sid":"xyz"}"#),
            Ok(Frame::Connect { namespace: "/".to_string() })
        );
        assert_eq!(
            decode("40/admin,"),
            Ok(Frame::Connect { namespace: "/admin".to_string() })
        );
    }

    #[test]
    fn decodes_events() {
        assert_eq!(
            decode(r#"42["wa:qr",{"qr":"2@abc","format":"raw"}]"#),
            Ok(Frame::Event {
                namespace: "/".to_string(),
                ack_id: None,
                name: "wa:qr".to_string(),
                args: vec![json!({ "qr": "2@abc", "format": "raw" })],
            })
        );
        assert_eq!(
            decode(r#"42/bot,7["wa:status","READY"]"#),
            Ok(Frame::Event {
                namespace: "/bot".to_string(),
                ack_id: Some(7),
                name: "wa:status".to_string(),
                args: vec![json!("READY")],
            })
        );
    }

    #[test]
    fn rejects_malformed_events() {
        assert_eq!(decode("42[]"), Err(FrameError::MissingEventName));
        assert_eq!(decode("42[1,2]"), Err(FrameError::MissingEventName));
        assert!(matches!(decode("42{"), Err(FrameError::InvalidPayload(_))));
    }

    #[test]
    fn decodes_connect_error() {
        assert_eq!(
            decode(r#"44{"message":"Authentication error"}"#),
            Ok(Frame::ConnectError {
                namespace: "/".to_string(),
                message: "Authentication error".to_string(),
            })
        );
    }

    #[test]
    fn encodes_connect_with_auth() {
        let auth = json!({ "token": "abc" });
        assert_eq!(encode_connect("/", &auth), r#"40{"token":"abc"}"#);
        assert_eq!(encode_connect("/bot", &auth), r#"40/bot,{"token":"abc"}"#);
    }
}
