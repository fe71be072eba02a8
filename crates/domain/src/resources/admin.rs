//! Back-office resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;
use crate::auth::AccountStatus;
use crate::error::{DomainError, DomainResult};
use crate::request::FormPart;

/// Status label the backend gives subscription requests awaiting review.
pub const UNDER_REVIEW_LABEL: &str = "قيد المراجعة";

/// `GET /admin/dashboard-stats` response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Registered users.
    #[serde(default)]
    pub total_users: u64,
    /// Active users.
    #[serde(default)]
    pub active_users: u64,
    /// Groups under management.
    #[serde(default)]
    pub total_groups: u64,
    /// Broadcasts sent.
    #[serde(default)]
    pub total_broadcasts: u64,
}

/// An entry of `GET /admin/users`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Plan name.
    #[serde(default)]
    pub plan: Option<String>,
    /// Account status.
    #[serde(default)]
    pub status: AccountStatus,
    /// Registration date.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A registration waiting for approval.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriber {
    /// Identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// E-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Registration date.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Approval request date.
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
}

/// A subscription payment submitted for review.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// Subscriber name.
    #[serde(default)]
    pub name: String,
    /// Subscriber phone.
    #[serde(default)]
    pub phone: String,
    /// Plan name.
    #[serde(default)]
    pub plan: Option<String>,
    /// Amount paid.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub amount: Option<f64>,
    /// Payment method.
    #[serde(default)]
    pub method: Option<String>,
    /// Server-relative path of the payment proof.
    #[serde(default)]
    pub proof_file: Option<String>,
    /// Review label.
    #[serde(default)]
    pub status: Option<String>,
    /// Date as sent by the backend.
    #[serde(default)]
    pub date: Option<String>,
    /// Submission date.
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
}

impl SubscriptionRequest {
    /// Whether the request still needs a decision.
    #[must_use]
    pub fn is_under_review(&self) -> bool {
        self.status.as_deref() == Some(UNDER_REVIEW_LABEL)
    }
}

/// A billing ledger entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRecord {
    /// Identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// Billed user, either an id or a populated document.
    #[serde(default)]
    pub user: Option<Value>,
    /// Plan name.
    #[serde(default)]
    pub plan: Option<String>,
    /// Amount.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub amount: Option<f64>,
    /// Payment method.
    #[serde(default)]
    pub method: Option<String>,
    /// Free-text status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Date as sent by the backend.
    #[serde(default)]
    pub date: Option<String>,
    /// Server-relative path of the payment proof.
    #[serde(default)]
    pub proof_file: Option<String>,
}

/// Manual billing entry for `POST /admin/billing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBillingRecord {
    /// Billed user.
    pub user_id: String,
    /// Plan name.
    pub plan: String,
    /// Amount, as typed.
    pub amount: String,
    /// Payment method.
    pub method: String,
    /// Status label.
    pub status: String,
    /// Optional proof file: name and bytes.
    pub proof: Option<(String, Vec<u8>)>,
}

impl NewBillingRecord {
    /// Builds the multipart fields.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when the user or the amount is blank.
    pub fn into_parts(self) -> DomainResult<Vec<FormPart>> {
        if self.user_id.trim().is_empty() {
            return Err(DomainError::MissingField("user_id"));
        }
        if self.amount.trim().is_empty() {
            return Err(DomainError::MissingField("amount"));
        }
        let mut parts = vec![
            FormPart::text("userId", self.user_id),
            FormPart::text("plan", self.plan),
            FormPart::text("amount", self.amount),
            FormPart::text("method", self.method),
            FormPart::text("status", self.status),
        ];
        if let Some((file_name, bytes)) = self.proof {
            parts.push(FormPart::file("proofFile", file_name, bytes));
        }
        Ok(parts)
    }
}

/// A bot process as reported by `GET /admin/bots`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    /// Identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// Phone of the account the bot runs for.
    #[serde(default)]
    pub user_phone: Option<String>,
    /// Free-text status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Groups handled.
    #[serde(default)]
    pub groups_count: u64,
    /// Last heartbeat, as sent by the backend.
    #[serde(default)]
    pub last_seen: Option<String>,
}

/// A broadcast message sent to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    /// Identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// Text.
    #[serde(default)]
    pub message: String,
    /// Send date, as sent by the backend.
    #[serde(default)]
    pub sent_at: Option<String>,
}
