//! Credential renewal scenarios against an in-process backend.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use groupguard_application::{
    ApiClient, ClientError, CredentialStore, HttpTransport, MemoryCredentialStore, Navigator,
    TransportError,
};
use groupguard_domain::request::AUTHORIZATION;
use groupguard_domain::{
    ApiRequest, ApiResponse, BearerToken, ClientConfig, CredentialKey, Landing, RequestBody, Role,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

struct Backend {
    accepted: Mutex<String>,
    refresh_reply: Mutex<ApiResponse>,
    refresh_delay: Duration,
    refresh_calls: AtomicUsize,
    seen: Mutex<Vec<(String, Option<String>)>>,
}

impl Backend {
    fn new(accepted: &str, refresh_reply: ApiResponse) -> Arc<Self> {
        Arc::new(Self {
            accepted: Mutex::new(accepted.to_string()),
            refresh_reply: Mutex::new(refresh_reply),
            refresh_delay: Duration::from_millis(100),
            refresh_calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn refreshing_to(token: &str) -> Arc<Self> {
        Self::new(token, ApiResponse::json(200, &json!({ "token": token })))
    }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn authorizations_for(&self, path: &str) -> Vec<Option<String>> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, auth)| auth.clone())
            .collect()
    }

    fn login(request: &ApiRequest) -> ApiResponse {
        let RequestBody::Json(body) = &request.body else {
            return ApiResponse::json(400, &json!({ "message": "JSON expected" }));
        };
        if body["password"] != "secret" {
            return ApiResponse::json(401, &json!({ "message": "Invalid credentials" }));
        }
        ApiResponse::json(
            200,
            &json!({
                "token": "session-1",
                "user": { "_id": "u1", "name": "Huda", "role": body["role"], "status": "active" },
                "subscription": { "status": "active", "plan": "monthly" }
            }),
        )
    }
}

impl HttpTransport for Backend {
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + '_>> {
        let request = request.clone();
        Box::pin(async move {
            let auth = request.header(AUTHORIZATION).map(String::from);
            self.seen.lock().unwrap().push((request.path.clone(), auth.clone()));

            match request.path.as_str() {
                "/auth/refresh" => {
                    self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(self.refresh_delay).await;
                    Ok(self.refresh_reply.lock().unwrap().clone())
                }
                "/auth/login" => Ok(Self::login(&request)),
                path => {
                    let expected = format!("Bearer {}", self.accepted.lock().unwrap());
                    if auth.as_deref() == Some(expected.as_str()) {
                        Ok(ApiResponse::json(200, &json!({ "path": path })))
                    } else {
                        Ok(ApiResponse::json(401, &json!({ "message": "jwt expired" })))
                    }
                }
            }
        })
    }
}

#[derive(Default)]
struct CountingNavigator(AtomicUsize);

impl CountingNavigator {
    fn redirects(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn redirect_to_login(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    client: Arc<ApiClient>,
    backend: Arc<Backend>,
    store: MemoryCredentialStore,
    navigator: Arc<CountingNavigator>,
}

fn harness(backend: Arc<Backend>, stored_token: Option<&str>) -> Harness {
    let store = MemoryCredentialStore::with_entries(
        stored_token.map(|t| (CredentialKey::Token, t.to_string())),
    );
    let navigator = Arc::new(CountingNavigator::default());
    let client = ApiClient::new(
        ClientConfig::new("http://backend.test"),
        backend.clone(),
        Arc::new(store.clone()),
        navigator.clone(),
    );
    Harness {
        client: Arc::new(client),
        backend,
        store,
        navigator,
    }
}

#[tokio::test]
async fn concurrent_401s_share_one_renewal() {
    let h = harness(Backend::refreshing_to("fresh"), Some("stale"));

    let (a, b, c) = tokio::join!(
        h.client.get_json::<Value>("/user/profile"),
        h.client.get_json::<Value>("/user/dashboard-stats"),
        h.client.get_json::<Value>("/wa/groups/sync"),
    );

    assert_eq!(a.unwrap()["path"], "/user/profile");
    assert_eq!(b.unwrap()["path"], "/user/dashboard-stats");
    assert_eq!(c.unwrap()["path"], "/wa/groups/sync");
    assert_eq!(h.backend.refresh_calls(), 1);
    assert_eq!(
        h.store.token().await.unwrap(),
        Some(BearerToken::new("fresh"))
    );
    assert_eq!(
        h.backend.authorizations_for("/user/dashboard-stats"),
        vec![
            Some("Bearer stale".to_string()),
            Some("Bearer fresh".to_string())
        ]
    );
    assert!(!h.client.is_renewing());
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_401s_across_tasks() {
    let h = harness(Backend::refreshing_to("fresh"), Some("stale"));

    let tasks: Vec<_> = ["/user/a", "/user/b", "/user/c", "/user/d"]
        .into_iter()
        .map(|path| {
            let client = h.client.clone();
            tokio::spawn(async move { client.get_json::<Value>(path).await })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(h.backend.refresh_calls(), 1);
}

#[tokio::test]
async fn later_calls_carry_the_renewed_token() {
    let h = harness(Backend::refreshing_to("fresh"), Some("stale"));

    h.client.get_json::<Value>("/user/profile").await.unwrap();
    h.client.get_json::<Value>("/user/notifications").await.unwrap();

    assert_eq!(
        h.backend.authorizations_for("/user/notifications"),
        vec![Some("Bearer fresh".to_string())]
    );
    assert_eq!(h.backend.refresh_calls(), 1);
}

#[tokio::test]
async fn renewal_failure_rejects_everyone_and_ends_session() {
    let backend = Backend::new(
        "never",
        ApiResponse::json(401, &json!({ "message": "refresh token expired" })),
    );
    let h = harness(backend, Some("stale"));
    h.store.set(CredentialKey::Name, "Huda").await.unwrap();

    let (a, b) = tokio::join!(
        h.client.get_json::<Value>("/user/profile"),
        h.client.get_json::<Value>("/user/violations"),
    );

    for result in [a, b] {
        let error = result.unwrap_err();
        assert!(error.is_unauthorized());
        assert!(error.to_string().contains("refresh token expired"));
    }
    assert_eq!(h.backend.refresh_calls(), 1);
    assert_eq!(h.store.count().await, 0);
    assert_eq!(h.navigator.redirects(), 1);
    assert!(!h.client.is_renewing());
}

#[tokio::test]
async fn replayed_request_is_not_renewed_twice() {
    let backend = Backend::new("other", ApiResponse::json(200, &json!({ "token": "fresh" })));
    let h = harness(backend, Some("stale"));

    let error = h
        .client
        .get_json::<Value>("/user/profile")
        .await
        .unwrap_err();

    assert!(error.is_unauthorized());
    assert_eq!(h.backend.refresh_calls(), 1);
    assert_eq!(h.backend.authorizations_for("/user/profile").len(), 2);
}

#[tokio::test]
async fn refresh_without_token_is_a_failure() {
    let backend = Backend::new("fresh", ApiResponse::json(200, &json!({ "ok": true })));
    let h = harness(backend, Some("stale"));

    let error = h
        .client
        .get_json::<Value>("/user/profile")
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::MissingToken));
    assert_eq!(h.store.token().await.unwrap(), None);
    assert_eq!(h.navigator.redirects(), 1);
}

#[tokio::test]
async fn login_401_is_not_renewed() {
    let h = harness(Backend::refreshing_to("fresh"), None);

    let error = h
        .client
        .login("772292869", "wrong", Role::User)
        .await
        .unwrap_err();

    assert!(error.is_unauthorized());
    assert!(error.to_string().contains("Invalid credentials"));
    assert_eq!(h.backend.refresh_calls(), 0);
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn login_stores_session_and_lands() {
    let h = harness(Backend::refreshing_to("session-1"), None);
    h.store
        .set(CredentialKey::NewUserId, "u1")
        .await
        .unwrap();

    let outcome = h
        .client
        .login(" 772292869 ", "secret", Role::User)
        .await
        .unwrap();

    assert_eq!(outcome.landing, Landing::Dashboard);
    let session = h.client.session().await.unwrap();
    assert_eq!(session.token, Some(BearerToken::new("session-1")));
    assert_eq!(session.role, Some(Role::User));
    assert_eq!(session.user_id.as_deref(), Some("u1"));
    assert_eq!(session.new_user_id, None);
    assert!(session.subscription.is_some());

    h.client.get_json::<Value>("/user/profile").await.unwrap();
    assert_eq!(h.backend.refresh_calls(), 0);
}

#[tokio::test]
async fn caller_authorization_is_kept() {
    let h = harness(Backend::refreshing_to("fresh"), Some("stale"));

    let response = h
        .client
        .request(ApiRequest::get("/user/profile").with_header(AUTHORIZATION, "Bearer fresh"))
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(h.backend.refresh_calls(), 0);
}

#[tokio::test]
async fn logout_clears_and_navigates() {
    let h = harness(Backend::refreshing_to("fresh"), Some("fresh"));

    h.client.logout().await.unwrap();

    assert!(!h.client.session().await.unwrap().is_authenticated());
    assert_eq!(h.navigator.redirects(), 1);
}
