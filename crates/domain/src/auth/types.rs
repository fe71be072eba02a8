//! Credential and session types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resources::{Subscription, SubscriptionStatus, de};

/// Opaque bearer credential sent as `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// A short, log-safe prefix of the token.
    #[must_use]
    pub fn preview(&self) -> String {
        let prefix: String = self.0.chars().take(6).collect();
        format!("{prefix}…")
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&self.preview()).finish()
    }
}

/// Fixed key set of the durable credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialKey {
    /// Bearer token.
    Token,
    /// Role of the logged-in account.
    Role,
    /// Display name.
    Name,
    /// User identifier.
    UserId,
    /// JSON snapshot of the subscription returned at login.
    Subscription,
    /// Identifier returned by registration, kept until first login.
    NewUserId,
}

impl CredentialKey {
    /// Every key, in storage order.
    pub const ALL: [Self; 6] = [
        Self::Token,
        Self::Role,
        Self::Name,
        Self::UserId,
        Self::Subscription,
        Self::NewUserId,
    ];

    /// Storage key string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Role => "role",
            Self::Name => "name",
            Self::UserId => "userId",
            Self::Subscription => "subscription",
            Self::NewUserId => "newUserId",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account role chosen at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular subscriber.
    #[default]
    User,
    /// Back-office administrator.
    Admin,
}

impl Role {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(crate::DomainError::InvalidValue {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle status of an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Registered, awaiting subscription approval.
    #[default]
    Pending,
    /// Active account.
    Active,
    /// Suspended by an administrator.
    Suspended,
    /// Banned by an administrator.
    Banned,
    /// Any status this client does not know.
    #[serde(other)]
    Unknown,
}

impl AccountStatus {
    /// Status an administrator toggle moves this account to.
    ///
    /// Active accounts get suspended; every other state is reactivated.
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Active => Self::Suspended,
            _ => Self::Active,
        }
    }
}

/// User block of the login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Role.
    #[serde(default)]
    pub role: Role,
    /// Account status.
    #[serde(default)]
    pub status: AccountStatus,
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Phone number, trimmed.
    pub phone: String,
    /// Password.
    pub password: String,
    /// Role the user logs in as.
    pub role: Role,
}

impl LoginRequest {
    /// Creates a login request; the phone number is trimmed.
    #[must_use]
    pub fn new(phone: &str, password: impl Into<String>, role: Role) -> Self {
        Self {
            phone: phone.trim().to_string(),
            password: password.into(),
            role,
        }
    }
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer credential.
    pub token: BearerToken,
    /// Logged-in user.
    pub user: UserSummary,
    /// Subscription snapshot, when the user has one.
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

impl LoginResponse {
    /// Entries to persist in the credential store.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription snapshot cannot be serialized.
    pub fn session_entries(&self) -> Result<Vec<(CredentialKey, String)>, serde_json::Error> {
        let mut entries = vec![
            (CredentialKey::Token, self.token.as_str().to_string()),
            (CredentialKey::Role, self.user.role.as_str().to_string()),
            (CredentialKey::Name, self.user.name.clone()),
            (CredentialKey::UserId, self.user.id.clone()),
        ];
        if let Some(subscription) = &self.subscription {
            entries.push((
                CredentialKey::Subscription,
                serde_json::to_string(subscription)?,
            ));
        }
        Ok(entries)
    }

    /// Where the console sends the user after logging in.
    #[must_use]
    pub fn landing(&self) -> Landing {
        Landing::after_login(&self.user, self.subscription.as_ref())
    }
}

/// `POST /auth/register` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    /// Server message.
    #[serde(default)]
    pub message: Option<String>,
    /// Created user.
    #[serde(default)]
    pub user: Option<RegisteredUser>,
}

/// User block of the registration response.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    /// New user identifier.
    #[serde(alias = "_id", deserialize_with = "de::id_string")]
    pub id: String,
}

/// `GET /auth/refresh` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    /// Renewed bearer credential; absence is a renewal failure.
    #[serde(default)]
    pub token: Option<BearerToken>,
}

/// Destination after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    /// Back-office dashboard.
    AdminDashboard,
    /// Subscriber dashboard.
    Dashboard,
    /// Subscription page, to pay or renew.
    Subscription,
    /// Account is suspended or banned.
    AccountInactive,
}

impl Landing {
    /// Routing rule applied after login.
    #[must_use]
    pub fn after_login(user: &UserSummary, subscription: Option<&Subscription>) -> Self {
        if user.role == Role::Admin {
            return Self::AdminDashboard;
        }
        match user.status {
            AccountStatus::Pending => Self::Subscription,
            AccountStatus::Active => match subscription {
                Some(s) if s.status == SubscriptionStatus::Active => Self::Dashboard,
                _ => Self::Subscription,
            },
            _ => Self::AccountInactive,
        }
    }

    /// Console path for this destination.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::AdminDashboard => "/admin/dashboard",
            Self::Dashboard => "/dashboard",
            Self::Subscription => "/subscription",
            Self::AccountInactive => "/",
        }
    }
}

/// Everything the credential store knows about the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Bearer credential.
    pub token: Option<BearerToken>,
    /// Role.
    pub role: Option<Role>,
    /// Display name.
    pub name: Option<String>,
    /// User identifier.
    pub user_id: Option<String>,
    /// Subscription snapshot.
    pub subscription: Option<Subscription>,
    /// Pending registration identifier.
    pub new_user_id: Option<String>,
}

impl Session {
    /// Rebuilds a session from raw store entries; unparsable values are dropped.
    #[must_use]
    pub fn from_entries(entries: &BTreeMap<CredentialKey, String>) -> Self {
        let get = |key| entries.get(&key).filter(|v| !v.is_empty()).cloned();
        Self {
            token: get(CredentialKey::Token).map(BearerToken::new),
            role: get(CredentialKey::Role).and_then(|r| r.parse().ok()),
            name: get(CredentialKey::Name),
            user_id: get(CredentialKey::UserId),
            subscription: get(CredentialKey::Subscription)
                .and_then(|s| serde_json::from_str(&s).ok()),
            new_user_id: get(CredentialKey::NewUserId),
        }
    }

    /// Whether a credential is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn login(user: serde_json::Value, subscription: Option<serde_json::Value>) -> LoginResponse {
        let mut body = json!({ "token": "tok", "user": user });
        if let Some(s) = subscription {
            body["subscription"] = s;
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn token_debug_does_not_leak() {
        let token = BearerToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret"));
        assert_eq!(token.header_value(), "Bearer eyJhbGciOiJIUzI1NiJ9.secret");
    }

    #[test]
    fn admin_lands_on_admin_dashboard() {
        let response = login(json!({ "id": 1, "name": "A", "role": "admin", "status": "active" }), None);
        assert_eq!(response.landing(), Landing::AdminDashboard);
    }

    #[test]
    fn user_landing_depends_on_status_and_subscription() {
        let pending = login(json!({ "id": "u1", "role": "user", "status": "pending" }), None);
        assert_eq!(pending.landing(), Landing::Subscription);

        let no_sub = login(json!({ "id": "u1", "role": "user", "status": "active" }), None);
        assert_eq!(no_sub.landing(), Landing::Subscription);

        let expired = login(
            json!({ "id": "u1", "role": "user", "status": "active" }),
            Some(json!({ "status": "expired" })),
        );
        assert_eq!(expired.landing(), Landing::Subscription);

        let active = login(
            json!({ "id": "u1", "role": "user", "status": "active" }),
            Some(json!({ "status": "active", "plan": "monthly" })),
        );
        assert_eq!(active.landing(), Landing::Dashboard);

        let banned = login(json!({ "id": "u1", "role": "user", "status": "banned" }), None);
        assert_eq!(banned.landing(), Landing::AccountInactive);
    }

    #[test]
    fn numeric_user_id_becomes_string() {
        let response = login(json!({ "id": 42, "name": "Sami", "role": "user", "status": "active" }), None);
        assert_eq!(response.user.id, "42");
    }

    #[test]
    fn session_round_trips_through_entries() {
        let response = login(
            json!({ "id": "u7", "name": "Huda", "role": "user", "status": "active" }),
            Some(json!({ "status": "active" })),
        );
        let entries: BTreeMap<_, _> = response.session_entries().unwrap().into_iter().collect();
        let session = Session::from_entries(&entries);

        assert_eq!(session.token, Some(BearerToken::new("tok")));
        assert_eq!(session.role, Some(Role::User));
        assert_eq!(session.name.as_deref(), Some("Huda"));
        assert_eq!(session.user_id.as_deref(), Some("u7"));
        assert_eq!(
            session.subscription.map(|s| s.status),
            Some(SubscriptionStatus::Active)
        );
        assert!(session.new_user_id.is_none());
    }

    #[test]
    fn toggled_status_follows_admin_rule() {
        assert_eq!(AccountStatus::Active.toggled(), AccountStatus::Suspended);
        assert_eq!(AccountStatus::Suspended.toggled(), AccountStatus::Active);
        assert_eq!(AccountStatus::Pending.toggled(), AccountStatus::Active);
        assert_eq!(AccountStatus::Banned.toggled(), AccountStatus::Active);
    }
}
