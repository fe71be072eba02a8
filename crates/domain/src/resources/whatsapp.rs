//! Bot session resources: groups and device recommendations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;

/// A group the bot account belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group JID, e.g. `1203630xxxx@g.us`.
    #[serde(default, deserialize_with = "de::opt_id_string")]
    pub id: Option<String>,
    /// Alternate JID field used by some backend versions.
    #[serde(default, deserialize_with = "de::opt_id_string")]
    pub gid: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Subject, when the name is absent.
    #[serde(default)]
    pub subject: Option<String>,
    /// Member count.
    #[serde(default)]
    pub size: Option<u64>,
    /// Only admins can post.
    #[serde(default)]
    pub is_announce: bool,
    /// Protection enabled for this group.
    #[serde(default)]
    pub is_protected: bool,
}

impl Group {
    /// The group JID, whichever field carried it.
    #[must_use]
    pub fn jid(&self) -> Option<&str> {
        self.id.as_deref().or(self.gid.as_deref())
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.name
            .as_deref()
            .or(self.subject.as_deref())
            .unwrap_or("(unnamed group)")
    }
}

/// Recommended way of pairing the companion device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMethod {
    /// Scan a QR code with another device.
    #[default]
    Qr,
    /// Open a pairing link on the same device.
    Link,
}

/// `GET /wa/device-info` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Backend recommendations.
    #[serde(default)]
    pub recommendations: Option<Value>,
}

impl DeviceInfo {
    /// Primary recommended method.
    ///
    /// `qr` and `link` are taken as is; anything else, or no
    /// recommendation, falls back to `fallback`.
    #[must_use]
    pub fn primary_method(&self, fallback: ConnectionMethod) -> ConnectionMethod {
        match self
            .recommendations
            .as_ref()
            .and_then(|r| r.get("primary"))
            .and_then(Value::as_str)
        {
            Some("qr") => ConnectionMethod::Qr,
            Some("link") => ConnectionMethod::Link,
            _ => fallback,
        }
    }
}
