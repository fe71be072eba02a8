//! Subscriptions, invoices and payment proofs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de;
use crate::error::{DomainError, DomainResult};
use crate::request::FormPart;

/// Lifecycle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Created, nothing paid yet.
    #[default]
    New,
    /// Waiting for a payment proof.
    PendingPayment,
    /// Proof uploaded, waiting for an administrator.
    UnderReview,
    /// Approved, not yet started.
    Approved,
    /// Running.
    Active,
    /// Suspended by an administrator.
    Suspended,
    /// Ran out.
    Expired,
    /// A status this client does not know.
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    /// User-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::PendingPayment => "awaiting payment",
            Self::UnderReview => "under review",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the subscriber is expected to upload a payment proof.
    #[must_use]
    pub const fn needs_payment(self) -> bool {
        matches!(self, Self::New | Self::PendingPayment | Self::Expired)
    }
}

/// A subscription as seen by its owner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Identifier.
    #[serde(default, alias = "_id", deserialize_with = "de::opt_id_string")]
    pub id: Option<String>,
    /// Status.
    #[serde(default)]
    pub status: SubscriptionStatus,
    /// Plan name, free text chosen by the subscriber.
    #[serde(default)]
    pub plan: Option<String>,
    /// Price.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub amount: Option<f64>,
    /// Currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Start date.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// Expiry date.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Review state of an uploaded invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Waiting for review.
    #[default]
    Pending,
    /// Accepted.
    Accepted,
    /// Rejected.
    Rejected,
    /// A status this client does not know.
    #[serde(other)]
    Unknown,
}

/// A payment proof attached to a subscription.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Identifier.
    #[serde(default, alias = "_id", deserialize_with = "de::opt_id_string")]
    pub id: Option<String>,
    /// Human invoice number.
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Amount paid.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub amount: Option<f64>,
    /// Currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Payment method.
    #[serde(default)]
    pub method: Option<String>,
    /// Transfer reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Review state.
    #[serde(default)]
    pub status: InvoiceStatus,
    /// Server-relative path of the uploaded proof.
    #[serde(default)]
    pub file_url: Option<String>,
    /// Upload date.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `GET/POST /user/subscription` response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SubscriptionOverview {
    /// `false` when the user has no subscription.
    #[serde(default)]
    pub success: bool,
    /// Server message, set on creation.
    #[serde(default)]
    pub message: Option<String>,
    /// Current subscription.
    #[serde(default)]
    pub subscription: Option<Subscription>,
    /// Uploaded invoices, newest first.
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

/// `POST /user/subscription` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    /// Plan name.
    pub plan: String,
    /// Amount, as typed.
    pub amount: String,
    /// Payment method.
    pub payment_method: String,
}

impl NewSubscription {
    /// Checks that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for the first empty field.
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [
            ("plan", &self.plan),
            ("amount", &self.amount),
            ("payment_method", &self.payment_method),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::MissingField(field));
            }
        }
        Ok(())
    }
}

/// Payment proof upload for `POST /user/subscription/{id}/invoice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceUpload {
    /// Amount paid.
    pub amount: String,
    /// Payment method.
    pub method: String,
    /// Transfer reference.
    pub reference: String,
    /// Proof file name.
    pub file_name: String,
    /// Proof file bytes.
    pub bytes: Vec<u8>,
}

impl InvoiceUpload {
    /// Builds the multipart fields.
    ///
    /// # Errors
    ///
    /// Returns `MissingField("invoice")` when no proof file is attached.
    pub fn into_parts(self) -> DomainResult<Vec<FormPart>> {
        if self.bytes.is_empty() {
            return Err(DomainError::MissingField("invoice"));
        }
        Ok(vec![
            FormPart::file("invoice", self.file_name, self.bytes),
            FormPart::text("amount", self.amount),
            FormPart::text("method", self.method),
            FormPart::text("reference", self.reference),
        ])
    }
}

/// A subscription waiting for administrator review.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubscription {
    /// Identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// Owner, either an id or a populated user document.
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
    /// Plan name.
    #[serde(default)]
    pub plan: Option<String>,
    /// Price.
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub amount: Option<f64>,
    /// Currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Status.
    #[serde(default)]
    pub status: SubscriptionStatus,
    /// Payment details supplied by the subscriber.
    #[serde(default)]
    pub payment_info: Option<serde_json::Value>,
    /// Attached invoices.
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn subscription_is_lenient() {
        let sub: Subscription = serde_json::from_value(json!({
            "_id": "s1",
            "status": "pending_payment",
            "amount": "49.5",
            "currency": "SAR",
            "expiresAt": "2026-01-01T00:00:00Z"
        }))
        .unwrap_or_default();

        assert_eq!(sub.id.as_deref(), Some("s1"));
        assert_eq!(sub.status, SubscriptionStatus::PendingPayment);
        assert_eq!(sub.amount, Some(49.5));
        assert!(sub.expires_at.is_some());
        assert!(sub.status.needs_payment());
    }

    #[test]
    fn unknown_status_does_not_fail() {
        let sub: Subscription =
            serde_json::from_value(json!({ "status": "frozen" })).unwrap_or_default();
        assert_eq!(sub.status, SubscriptionStatus::Unknown);
    }

    #[test]
    fn new_subscription_requires_all_fields() {
        let sub = NewSubscription {
            plan: "monthly".into(),
            amount: " ".into(),
            payment_method: "bank transfer".into(),
        };
        assert_eq!(sub.validate(), Err(DomainError::MissingField("amount")));
    }

    #[test]
    fn invoice_upload_requires_file() {
        let upload = InvoiceUpload {
            amount: "50".into(),
            method: "STC Pay".into(),
            reference: "R-1".into(),
            file_name: "proof.jpg".into(),
            bytes: Vec::new(),
        };
        assert_eq!(upload.into_parts(), Err(DomainError::MissingField("invoice")));
    }

    #[test]
    fn invoice_upload_puts_file_first() {
        let upload = InvoiceUpload {
            amount: "50".into(),
            method: "STC Pay".into(),
            reference: "R-1".into(),
            file_name: "proof.jpg".into(),
            bytes: vec![0xff, 0xd8],
        };
        let parts = upload.into_parts().unwrap_or_default();
        let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["invoice", "amount", "method", "reference"]);
    }
}
