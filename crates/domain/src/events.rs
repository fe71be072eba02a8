//! Push channel event types.
//!
//! The bot backend pushes pairing progress over a socket.io channel using
//! three named events: `wa:qr`, `wa:status` and `wa:error`. They are decoded
//! here into a closed set of typed events, plus the channel's own
//! connect/disconnect notifications.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name carrying a pairing code.
pub const QR_EVENT: &str = "wa:qr";
/// Event name carrying a session state string.
pub const STATUS_EVENT: &str = "wa:status";
/// Event name carrying a free-text error.
pub const ERROR_EVENT: &str = "wa:error";

/// How a pairing code is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QrEncoding {
    /// Raw pairing string; the consumer renders the QR image itself.
    Raw,
    /// `data:image/...` URL, ready to render.
    DataUrl,
}

impl QrEncoding {
    /// Decides the encoding from the payload and the optional `format` hint.
    #[must_use]
    pub fn detect(data: &str, format: Option<&str>) -> Self {
        if data.starts_with("data:image") || format == Some("dataurl") {
            Self::DataUrl
        } else {
            Self::Raw
        }
    }
}

/// State of the remote messaging session, as reported by `wa:status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for the companion device to scan the code.
    AwaitingScan,
    /// Scan accepted, credentials verified.
    Authenticated,
    /// Session fully ready.
    Ready,
    /// Session dropped.
    Disconnected,
    /// Automatic reconnection gave up.
    ReconnectFailed,
    /// Backend-side failure.
    Error,
    /// Any other status string, kept verbatim.
    Other(String),
}

impl SessionState {
    /// Parses a wire status string.
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        match status {
            "AWAITING_SCAN" => Self::AwaitingScan,
            "AUTHENTICATED" => Self::Authenticated,
            "READY" => Self::Ready,
            "DISCONNECTED" => Self::Disconnected,
            "RECONNECT_FAILED" => Self::ReconnectFailed,
            "ERROR" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire status string.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::AwaitingScan => "AWAITING_SCAN",
            Self::Authenticated => "AUTHENTICATED",
            Self::Ready => "READY",
            Self::Disconnected => "DISCONNECTED",
            Self::ReconnectFailed => "RECONNECT_FAILED",
            Self::Error => "ERROR",
            Self::Other(s) => s,
        }
    }

    /// Whether the device is paired and the pairing code can be discarded.
    #[must_use]
    pub const fn is_paired(&self) -> bool {
        matches!(self, Self::Ready | Self::Authenticated)
    }

    /// User-facing status line.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::AwaitingScan => "Scan the code with WhatsApp within 60 seconds".to_string(),
            Self::Authenticated => "Session verified.".to_string(),
            Self::Ready => "Session ready.".to_string(),
            Self::Disconnected => "Session disconnected. You can generate a new code.".to_string(),
            Self::ReconnectFailed => "Automatic reconnection failed.".to_string(),
            Self::Error => "A connection error occurred.".to_string(),
            Self::Other(s) if s.is_empty() => "Status update".to_string(),
            Self::Other(s) => s.clone(),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Discriminant of [`PushEvent`], used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `Connected` / `Disconnected`.
    Connection,
    /// `QrReceived`.
    Qr,
    /// `StatusChanged`.
    Status,
    /// `ErrorOccurred`.
    Error,
}

/// A typed push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// The channel connected and authenticated.
    Connected,
    /// The channel dropped.
    Disconnected {
        /// Why, as far as the client knows.
        reason: String,
    },
    /// A pairing code arrived.
    QrReceived {
        /// Code payload; empty when the backend had no code to give.
        data: String,
        /// Payload encoding.
        encoding: QrEncoding,
    },
    /// The session state changed.
    StatusChanged {
        /// New state.
        state: SessionState,
    },
    /// The backend reported an error.
    ErrorOccurred {
        /// Error text; empty when the backend sent none.
        message: String,
    },
}

impl PushEvent {
    /// Kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Connected | Self::Disconnected { .. } => EventKind::Connection,
            Self::QrReceived { .. } => EventKind::Qr,
            Self::StatusChanged { .. } => EventKind::Status,
            Self::ErrorOccurred { .. } => EventKind::Error,
        }
    }

    /// Decodes a named event with its first argument.
    ///
    /// Returns `None` for event names outside the fixed set.
    #[must_use]
    pub fn from_named(name: &str, payload: &Value) -> Option<Self> {
        match name {
            QR_EVENT => {
                let data = payload
                    .get("qr")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let format = payload.get("format").and_then(Value::as_str);
                let encoding = QrEncoding::detect(&data, format);
                Some(Self::QrReceived { data, encoding })
            }
            STATUS_EVENT => {
                let status = text_or_field(payload, &["status", "state"]);
                Some(Self::StatusChanged {
                    state: SessionState::from_wire(&status),
                })
            }
            ERROR_EVENT => Some(Self::ErrorOccurred {
                message: text_or_field(payload, &["message", "error"]),
            }),
            _ => None,
        }
    }
}

/// A payload that is either a bare string or an object with one of `fields`.
fn text_or_field(payload: &Value, fields: &[&str]) -> String {
    if let Some(s) = payload.as_str() {
        return s.to_string();
    }
    fields
        .iter()
        .find_map(|f| payload.get(f).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}
