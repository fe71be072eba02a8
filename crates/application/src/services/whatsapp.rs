//! `/wa` endpoints: bot session, protection settings and groups.

use groupguard_domain::resources::{DeviceInfo, Group, ProtectionSettings};
use groupguard_domain::{Ack, ApiRequest, RequestBody, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

#[derive(Deserialize)]
struct SettingsEnvelope {
    #[serde(default)]
    settings: Option<ProtectionSettings>,
}

#[derive(Deserialize)]
struct GroupsEnvelope {
    #[serde(default)]
    groups: Vec<Group>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceInfoEnvelope {
    #[serde(default)]
    device_info: DeviceInfo,
}

/// Bot session endpoints.
#[derive(Debug, Clone, Copy)]
pub struct WhatsAppApi<'a> {
    client: &'a ApiClient,
}

impl<'a> WhatsAppApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Starts or restarts the bot session; the pairing code arrives on the
    /// push channel.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn start_session(&self) -> ClientResult<Ack> {
        self.client
            .action(ApiRequest::post("/wa/session/start").with_body(RequestBody::empty_object()))
            .await
    }

    /// Protection settings of the bot session.
    ///
    /// Returns `None` when no bot session exists yet (HTTP 404); callers
    /// then show [`ProtectionSettings::default`].
    ///
    /// # Errors
    ///
    /// Returns the client error for anything but a 404.
    pub async fn protection_settings(&self) -> ClientResult<Option<ProtectionSettings>> {
        match self
            .client
            .get_json::<SettingsEnvelope>("/wa/session/settings")
            .await
        {
            Ok(envelope) => Ok(Some(envelope.settings.unwrap_or_default())),
            Err(error) if error.status() == Some(StatusCode::NOT_FOUND) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Saves the protection settings.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn update_protection_settings(&self, settings: &ProtectionSettings) -> ClientResult<Ack> {
        self.client
            .action(ApiRequest::put("/wa/session/settings").with_json(settings)?)
            .await
    }

    /// Groups the bot account belongs to, freshly synced.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn sync_groups(&self) -> ClientResult<Vec<Group>> {
        let envelope: GroupsEnvelope = self.client.get_json("/wa/groups/sync").await?;
        Ok(envelope.groups)
    }

    /// Joins a group through an invite link.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank link, otherwise the client error.
    pub async fn join_group(&self, invite_link: &str) -> ClientResult<Ack> {
        let invite_link = invite_link.trim();
        if invite_link.is_empty() {
            return Err(ClientError::Validation(
                groupguard_domain::DomainError::MissingField("invite_link"),
            ));
        }
        self.client
            .action(ApiRequest::post("/wa/groups/join").with_json(&json!({ "inviteLink": invite_link }))?)
            .await
    }

    /// Sends a text message to a group.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn send_message(&self, jid: &str, text: &str) -> ClientResult<Ack> {
        self.client
            .action(ApiRequest::post("/wa/groups/send").with_json(&json!({ "jid": jid, "text": text }))?)
            .await
    }

    /// Leaves a group.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn leave_group(&self, jid: &str) -> ClientResult<Ack> {
        self.client
            .action(ApiRequest::post("/wa/groups/leave").with_json(&json!({ "jid": jid }))?)
            .await
    }

    /// Device information and pairing recommendations.
    ///
    /// # Errors
    ///
    /// Returns the client error.
    pub async fn device_info(&self) -> ClientResult<DeviceInfo> {
        let envelope: DeviceInfoEnvelope = self.client.get_json("/wa/device-info").await?;
        Ok(envelope.device_info)
    }
}
