//! Authenticated API client.
//!
//! Every backend call goes through [`ApiClient::request`]. It attaches the
//! stored bearer credential, and when a protected call comes back 401 it
//! renews the credential once, shared across all callers that failed in the
//! meantime, and replays the call.

use std::fmt;
use std::sync::Arc;

use groupguard_domain::auth::{RefreshResponse, RegisterResponse, UserSummary};
use groupguard_domain::request::{AUTHORIZATION, LOGIN_PATH, REFRESH_PATH, REGISTER_PATH};
use groupguard_domain::resources::Subscription;
use groupguard_domain::{
    Ack, ApiRequest, ApiResponse, BearerToken, ClientConfig, CredentialKey, HttpMethod, Landing,
    LoginRequest, LoginResponse, RegistrationForm, Role, Session,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::auth::{RenewalCoordinator, RenewalTicket};
use crate::error::{ClientError, ClientResult};
use crate::ports::{CredentialStore, HttpTransport, Navigator};
use crate::services::{AdminApi, UserApi, WhatsAppApi};

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    /// Logged-in user.
    pub user: UserSummary,
    /// Subscription snapshot returned with the login.
    pub subscription: Option<Subscription>,
    /// Where the user should go next.
    pub landing: Landing,
}

/// HTTP client for the GroupGuard backend.
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    renewal: RenewalCoordinator,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("renewal", &self.renewal)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client over the given adapters.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            transport,
            store,
            navigator,
            renewal: RenewalCoordinator::new(),
        }
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Credential store backing this client.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Whether a credential renewal is running.
    #[must_use]
    pub fn is_renewing(&self) -> bool {
        self.renewal.is_renewing()
    }

    /// Subscriber endpoints.
    #[must_use]
    pub const fn user(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    /// Bot session endpoints.
    #[must_use]
    pub const fn whatsapp(&self) -> WhatsAppApi<'_> {
        WhatsAppApi::new(self)
    }

    /// Back-office endpoints.
    #[must_use]
    pub const fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    /// Sends a request, renewing the credential once on 401.
    ///
    /// The stored credential is attached unless the caller set
    /// `Authorization` already.
    ///
    /// # Errors
    ///
    /// Returns `Http` for non-2xx responses, `Transport` when no response
    /// was received, and the renewal's own error when a 401 could not be
    /// recovered.
    pub async fn request(&self, mut request: ApiRequest) -> ClientResult<ApiResponse> {
        if !request.has_authorization() {
            if let Some(token) = self.store.token().await? {
                request.set_header(AUTHORIZATION, token.header_value());
            }
        }

        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(&request).await?;
        if response.is_success() {
            return Ok(response);
        }

        if !response.status.is_unauthorized() || request.is_retried() || request.is_auth_route() {
            return Err(ClientError::from_response(&response));
        }

        request.mark_retried();
        let token = self.renew_shared().await?;
        self.replay(request, &token).await
    }

    /// Sends a request and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request), plus `Decode` for unexpected bodies.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let response = self.request(request).await?;
        Ok(response.json_body()?)
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.fetch(ApiRequest::get(path)).await
    }

    /// Sends a JSON body and decodes the JSON answer.
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn send_json<B, T>(&self, method: HttpMethod, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::new(method, path).with_json(body)?;
        self.fetch(request).await
    }

    /// Sends an action request.
    ///
    /// Any 2xx reply counts as acknowledged; a JSON object body contributes
    /// its `success` and `message` fields, anything else is ignored.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn action(&self, request: ApiRequest) -> ClientResult<Ack> {
        let response = self.request(request).await?;
        let ack = match response.json_value() {
            Some(value @ serde_json::Value::Object(_)) => {
                serde_json::from_value(value).unwrap_or_else(|error| {
                    debug!(%error, "unrecognized acknowledgement body");
                    Ack::default()
                })
            }
            _ => Ack::default(),
        };
        Ok(ack)
    }

    /// Logs in and stores the session.
    ///
    /// A pending registration id is forgotten once the account logs in.
    ///
    /// # Errors
    ///
    /// Returns `Http` for rejected credentials; a 401 here is never renewed.
    pub async fn login(&self, phone: &str, password: &str, role: Role) -> ClientResult<LoginOutcome> {
        let body = LoginRequest::new(phone, password, role);
        let response: LoginResponse = self.send_json(HttpMethod::Post, LOGIN_PATH, &body).await?;

        self.store.set_many(&response.session_entries()?).await?;
        self.store.remove(CredentialKey::NewUserId).await?;

        let landing = response.landing();
        info!(user = %response.user.id, role = response.user.role.as_str(), landing = landing.path(), "logged in");
        Ok(LoginOutcome {
            user: response.user,
            subscription: response.subscription,
            landing,
        })
    }

    /// Validates the form locally, then registers the account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without touching the network when the form is
    /// invalid, `Http` when the backend refuses it.
    pub async fn register(&self, form: &RegistrationForm) -> ClientResult<RegisterResponse> {
        let payload = form.validate()?;
        let response: RegisterResponse = self
            .send_json(HttpMethod::Post, REGISTER_PATH, &payload)
            .await?;
        if let Some(user) = &response.user {
            self.store.set(CredentialKey::NewUserId, &user.id).await?;
        }
        info!(phone = %payload.phone, "account registered");
        Ok(response)
    }

    /// Forgets the session and returns to the entry point.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the credentials could not be removed.
    pub async fn logout(&self) -> ClientResult<()> {
        self.store.clear().await?;
        info!("logged out");
        self.navigator.redirect_to_login();
        Ok(())
    }

    /// Snapshot of the stored session.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the store cannot be read.
    pub async fn session(&self) -> ClientResult<Session> {
        Ok(self.store.session().await?)
    }

    /// The stored bearer credential.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the store cannot be read.
    pub async fn current_token(&self) -> ClientResult<Option<BearerToken>> {
        Ok(self.store.token().await?)
    }

    /// Renews the credential now, joining a renewal already in flight.
    ///
    /// # Errors
    ///
    /// Returns the renewal error; the session has then been ended.
    pub async fn renew(&self) -> ClientResult<BearerToken> {
        self.renew_shared().await
    }

    async fn renew_shared(&self) -> ClientResult<BearerToken> {
        match self.renewal.begin() {
            RenewalTicket::Follower(rx) => rx.await.unwrap_or(Err(ClientError::RenewalAbandoned)),
            RenewalTicket::Leader(guard) => {
                info!("credential rejected, renewing session");
                let outcome = self.call_refresh().await;
                guard.settle(&outcome);
                match &outcome {
                    Ok(token) => debug!(token = %token.preview(), "session renewed"),
                    Err(error) => self.end_session(error).await,
                }
                outcome
            }
        }
    }

    /// One renewal call, straight to the transport so that a 401 here can't
    /// recurse into another renewal.
    async fn call_refresh(&self) -> ClientResult<BearerToken> {
        let response = self.transport.execute(&ApiRequest::get(REFRESH_PATH)).await?;
        if !response.is_success() {
            return Err(ClientError::from_response(&response));
        }
        let token = response
            .json_body::<RefreshResponse>()?
            .token
            .filter(|t| !t.as_str().is_empty())
            .ok_or(ClientError::MissingToken)?;
        self.store.set(CredentialKey::Token, token.as_str()).await?;
        Ok(token)
    }

    async fn end_session(&self, error: &ClientError) {
        warn!(%error, "session renewal failed, signing out");
        if let Err(store_error) = self.store.clear().await {
            warn!(error = %store_error, "failed to clear credentials");
        }
        self.navigator.redirect_to_login();
    }

    async fn replay(&self, mut request: ApiRequest, token: &BearerToken) -> ClientResult<ApiResponse> {
        request.set_header(AUTHORIZATION, token.header_value());
        debug!(method = %request.method, path = %request.path, "replaying request");
        let response = self.transport.execute(&request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ClientError::from_response(&response))
        }
    }
}
