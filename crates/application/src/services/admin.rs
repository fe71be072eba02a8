//! `/admin` endpoints.

use groupguard_domain::resources::{
    AdminStats, BillingRecord, Bot, Broadcast, NewBillingRecord, NewSubscriber,
    PendingSubscription, SubscriptionRequest, UserAccount,
};
use groupguard_domain::{AccountStatus, Ack, ApiRequest, DomainError, RequestBody};
use serde::Deserialize;
use serde_json::json;

use super::{Listing, segment};
use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

#[derive(Deserialize)]
struct PendingEnvelope {
    #[serde(default)]
    subscriptions: Vec<PendingSubscription>,
}

#[derive(Deserialize)]
struct BroadcastEnvelope {
    broadcast: Broadcast,
}

/// Back-office endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn dashboard_stats(&self) -> ClientResult<AdminStats> {
        self.client.get_json("/admin/dashboard-stats").await
    }

    /// Every account.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn users(&self) -> ClientResult<Vec<UserAccount>> {
        self.client.get_json("/admin/users").await
    }

    /// Sets an account's status.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn set_user_status(&self, id: &str, status: &AccountStatus) -> ClientResult<Ack> {
        self.client
            .action(
                ApiRequest::put(format!("/admin/users/{}/status", segment(id)))
                    .with_json(&json!({ "status": status }))?,
            )
            .await
    }

    /// Suspends an active account, reactivates any other; returns the new
    /// status.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn toggle_user_status(&self, user: &UserAccount) -> ClientResult<AccountStatus> {
        let next = user.status.toggled();
        self.set_user_status(&user.id, &next).await?;
        Ok(next)
    }

    /// Deletes an account.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn delete_user(&self, id: &str) -> ClientResult<Ack> {
        self.client
            .action(ApiRequest::delete(format!("/admin/users/{}", segment(id))))
            .await
    }

    /// Registrations waiting for approval.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn new_subscribers(&self) -> ClientResult<Vec<NewSubscriber>> {
        self.client.get_json("/admin/new-subscribers").await
    }

    /// Approves or rejects a registration.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn review_subscriber(&self, id: &str, approve: bool) -> ClientResult<Ack> {
        let verb = if approve { "approve" } else { "reject" };
        self.client
            .action(
                ApiRequest::put(format!("/admin/new-subscribers/{verb}/{}", segment(id)))
                    .with_body(RequestBody::empty_object()),
            )
            .await
    }

    /// Submitted subscription payments.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn subscription_requests(&self) -> ClientResult<Vec<SubscriptionRequest>> {
        self.client.get_json("/admin/subscription-requests").await
    }

    /// Approves a subscription payment.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn approve_request(&self, id: &str) -> ClientResult<Ack> {
        self.client
            .action(ApiRequest::post(format!(
                "/admin/subscription-requests/{}/approve",
                segment(id)
            )))
            .await
    }

    /// Rejects a subscription payment.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn reject_request(&self, id: &str, reason: &str) -> ClientResult<Ack> {
        self.client
            .action(
                ApiRequest::post(format!("/admin/subscription-requests/{}/reject", segment(id)))
                    .with_json(&json!({ "reason": reason }))?,
            )
            .await
    }

    /// Subscriptions waiting for invoice review.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn pending_subscriptions(&self) -> ClientResult<Vec<PendingSubscription>> {
        let envelope: PendingEnvelope = self.client.get_json("/admin/subscriptions/pending").await?;
        Ok(envelope.subscriptions)
    }

    /// Approves a pending subscription.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn approve_subscription(&self, id: &str) -> ClientResult<Ack> {
        self.client
            .action(
                ApiRequest::patch(format!("/admin/subscriptions/{}/approve", segment(id)))
                    .with_body(RequestBody::empty_object()),
            )
            .await
    }

    /// Rejects a pending subscription.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank reason, otherwise the client error.
    pub async fn reject_subscription(&self, id: &str, reason: &str) -> ClientResult<Ack> {
        if reason.trim().is_empty() {
            return Err(ClientError::Validation(DomainError::MissingField("reason")));
        }
        self.client
            .action(
                ApiRequest::patch(format!("/admin/subscriptions/{}/reject", segment(id)))
                    .with_json(&json!({ "reason": reason.trim() }))?,
            )
            .await
    }

    /// Billing ledger.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn billing(&self) -> ClientResult<Vec<BillingRecord>> {
        let listing: Listing<BillingRecord> = self.client.get_json("/admin/billing").await?;
        Ok(listing.into_vec())
    }

    /// Adds a manual billing entry.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for missing fields, otherwise the client error.
    pub async fn add_billing(&self, record: NewBillingRecord) -> ClientResult<Ack> {
        let parts = record.into_parts()?;
        self.client
            .action(ApiRequest::post("/admin/billing").with_body(RequestBody::Multipart(parts)))
            .await
    }

    /// Bot processes.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn bots(&self) -> ClientResult<Vec<Bot>> {
        self.client.get_json("/admin/bots").await
    }

    /// Restarts a bot.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn restart_bot(&self, id: &str) -> ClientResult<Ack> {
        self.bot_action("restart", id).await
    }

    /// Stops a bot.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn stop_bot(&self, id: &str) -> ClientResult<Ack> {
        self.bot_action("stop", id).await
    }

    async fn bot_action(&self, verb: &str, id: &str) -> ClientResult<Ack> {
        self.client
            .action(
                ApiRequest::post(format!("/admin/bots/{verb}/{}", segment(id)))
                    .with_body(RequestBody::empty_object()),
            )
            .await
    }

    /// Past broadcasts.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn broadcasts(&self) -> ClientResult<Vec<Broadcast>> {
        self.client.get_json("/admin/broadcast").await
    }

    /// Sends a broadcast to every subscriber.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank message, otherwise the client error.
    pub async fn broadcast(&self, message: &str) -> ClientResult<Broadcast> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ClientError::Validation(DomainError::MissingField("message")));
        }
        let envelope: BroadcastEnvelope = self
            .client
            .fetch(ApiRequest::post("/admin/broadcast").with_json(&json!({ "message": message }))?)
            .await?;
        Ok(envelope.broadcast)
    }
}
