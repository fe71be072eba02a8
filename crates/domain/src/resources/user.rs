//! Subscriber-side resources: profile, dashboard and notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;
use crate::auth::{AccountStatus, Role};

/// `GET /user/profile` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// E-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// Account status.
    #[serde(default)]
    pub status: AccountStatus,
    /// Role.
    #[serde(default)]
    pub role: Role,
    /// Registration date.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Free-form preferences, sent back verbatim by `PUT /user/profile`.
    #[serde(default)]
    pub settings: Option<Value>,
}

/// `GET /user/dashboard-stats` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Groups the bot is in.
    #[serde(default)]
    pub user_groups: u64,
    /// Groups with protection on.
    #[serde(default)]
    pub active_groups: u64,
    /// Most recent billing entry, shape decided by the backend.
    #[serde(default)]
    pub latest_billing: Option<Value>,
}

/// A moderation action taken by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// Group where it happened.
    #[serde(default)]
    pub group_name: Option<String>,
    /// Matched word.
    #[serde(default)]
    pub detected_word: Option<String>,
    /// Reason given by the bot.
    #[serde(default)]
    pub reason: Option<String>,
    /// Action taken.
    #[serde(default)]
    pub action: Option<String>,
    /// When.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An entry of `GET /user/notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notification {
    /// Identifier.
    #[serde(default, alias = "_id", deserialize_with = "de::opt_id_string")]
    pub id: Option<String>,
    /// Text.
    #[serde(default)]
    pub message: String,
    /// Date as sent by the backend.
    #[serde(default)]
    pub date: Option<String>,
}
