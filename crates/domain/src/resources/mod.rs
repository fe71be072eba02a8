//! Resource models returned by the backend's `/user`, `/wa` and `/admin` endpoints.
//!
//! The backend is a document store: identifiers arrive as `_id` (sometimes
//! `id`), numbers sometimes arrive as strings, and most fields are optional.
//! The models are deliberately lenient.

mod admin;
mod protection;
mod subscription;
mod user;
mod whatsapp;

pub use admin::{
    AdminStats, BillingRecord, Bot, Broadcast, NewBillingRecord, NewSubscriber,
    SubscriptionRequest, UNDER_REVIEW_LABEL, UserAccount,
};
pub use protection::{BannedWord, MatchType, NewBannedWord, ProtectionOptions, ProtectionSettings, Severity, WordAction};
pub use subscription::{
    Invoice, InvoiceStatus, InvoiceUpload, NewSubscription, PendingSubscription, Subscription,
    SubscriptionOverview, SubscriptionStatus,
};
pub use user::{DashboardStats, Notification, Profile, Violation};
pub use whatsapp::{ConnectionMethod, DeviceInfo, Group};

use serde::Deserialize;

/// Generic `{success, message}` acknowledgement returned by action endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    /// Whether the backend applied the action.
    #[serde(default)]
    pub success: Option<bool>,
    /// Human-readable outcome.
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    /// An acknowledgement counts as success unless the backend says otherwise.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }
}

pub(crate) mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Accepts string or numeric identifiers.
    pub fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number id, got {other}"
            ))),
        }
    }

    /// Optional variant of [`id_string`].
    pub fn opt_id_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Accepts numbers, numeric strings, empty strings and null.
    pub fn lenient_f64<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}
