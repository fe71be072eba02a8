//! `/user` endpoints.

use groupguard_domain::resources::{
    BannedWord, DashboardStats, InvoiceUpload, NewBannedWord, NewSubscription, Notification,
    Profile, SubscriptionOverview, Violation,
};
use groupguard_domain::{Ack, ApiRequest, HttpMethod, RequestBody};
use serde::Deserialize;
use serde_json::{Value, json};

use super::segment;
use crate::client::ApiClient;
use crate::error::ClientResult;

#[derive(Deserialize)]
struct ViolationsEnvelope {
    #[serde(default)]
    violations: Vec<Violation>,
}

#[derive(Deserialize)]
struct WordsEnvelope {
    #[serde(default)]
    words: Vec<BannedWord>,
}

/// Subscriber endpoints.
#[derive(Debug, Clone, Copy)]
pub struct UserApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn profile(&self) -> ClientResult<Profile> {
        self.client.get_json("/user/profile").await
    }

    /// Replaces the user's free-form preferences.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn update_settings(&self, settings: &Value) -> ClientResult<Ack> {
        self.client
            .action(ApiRequest::put("/user/profile").with_json(&json!({ "settings": settings }))?)
            .await
    }

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn dashboard_stats(&self) -> ClientResult<DashboardStats> {
        self.client.get_json("/user/dashboard-stats").await
    }

    /// Most recent moderation actions.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn recent_violations(&self, limit: u32) -> ClientResult<Vec<Violation>> {
        let envelope: ViolationsEnvelope = self
            .client
            .fetch(ApiRequest::get("/user/violations").with_query("limit", limit.to_string()))
            .await?;
        Ok(envelope.violations)
    }

    /// Notifications for the user.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn notifications(&self) -> ClientResult<Vec<Notification>> {
        self.client.get_json("/user/notifications").await
    }

    /// The banned-word list. The backend answers 400 when the list was
    /// never created; that is reported as an empty list.
    ///
    /// # Errors
    ///
    /// Returns the client error for anything but a 400.
    pub async fn banned_words(&self) -> ClientResult<Vec<BannedWord>> {
        match self.client.get_json::<WordsEnvelope>("/user/banned-words").await {
            Ok(envelope) => Ok(envelope.words),
            Err(error) if error.has_status(400) => Ok(Vec::new()),
            Err(error) => Err(error),
        }
    }

    /// Adds a banned word.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank word, otherwise the client error.
    pub async fn add_banned_word(&self, word: NewBannedWord) -> ClientResult<Ack> {
        let word = word.validated()?;
        self.client
            .action(ApiRequest::post("/user/banned-words").with_json(&word)?)
            .await
    }

    /// Enables or disables a banned word.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn toggle_banned_word(&self, id: &str) -> ClientResult<Ack> {
        self.client
            .action(ApiRequest::put(format!("/user/banned-words/{}/toggle", segment(id))))
            .await
    }

    /// Deletes a banned word.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn delete_banned_word(&self, id: &str) -> ClientResult<Ack> {
        self.client
            .action(ApiRequest::delete(format!("/user/banned-words/{}", segment(id))))
            .await
    }

    /// Flips protection for one group.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn toggle_group_protection(&self, jid: &str) -> ClientResult<Ack> {
        self.client
            .action(
                ApiRequest::put(format!("/user/groups/{}/protection", segment(jid)))
                    .with_body(RequestBody::empty_object()),
            )
            .await
    }

    /// Current subscription and its invoices.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn subscription(&self) -> ClientResult<SubscriptionOverview> {
        self.client.get_json("/user/subscription").await
    }

    /// Requests a subscription.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when a field is blank, otherwise the client error.
    pub async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> ClientResult<SubscriptionOverview> {
        subscription.validate()?;
        self.client
            .send_json(HttpMethod::Post, "/user/subscription", subscription)
            .await
    }

    /// Uploads a payment proof for a subscription.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when no file is attached, otherwise the client
    /// error.
    pub async fn upload_invoice(&self, subscription_id: &str, upload: InvoiceUpload) -> ClientResult<Ack> {
        let parts = upload.into_parts()?;
        self.client
            .action(
                ApiRequest::post(format!("/user/subscription/{}/invoice", segment(subscription_id)))
                    .with_body(RequestBody::Multipart(parts)),
            )
            .await
    }
}
