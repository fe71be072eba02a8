//! Credential renewal end to end: API client, reqwest transport, mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use groupguard_application::{ApiClient, CredentialStore, MemoryCredentialStore, Navigator};
use groupguard_domain::{BearerToken, ClientConfig, CredentialKey};
use groupguard_infrastructure::ReqwestTransport;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CountingNavigator(AtomicUsize);

impl Navigator for CountingNavigator {
    fn redirect_to_login(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    client: ApiClient,
    store: MemoryCredentialStore,
    navigator: Arc<CountingNavigator>,
}

fn harness(server: &MockServer, token: &str) -> Harness {
    let config = ClientConfig::new(server.uri());
    let store = MemoryCredentialStore::with_entries([
        (CredentialKey::Token, token.to_string()),
        (CredentialKey::Name, "Huda".to_string()),
    ]);
    let navigator = Arc::new(CountingNavigator::default());
    let client = ApiClient::new(
        config.clone(),
        Arc::new(ReqwestTransport::new(&config).unwrap()),
        Arc::new(store.clone()),
        navigator.clone(),
    );
    Harness {
        client,
        store,
        navigator,
    }
}

async fn mount_profile(server: &MockServer, accepted: &str) {
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .and(header("authorization", format!("Bearer {accepted}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Huda",
            "phone": "+967772292869",
            "status": "active",
            "role": "user"
        })))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn three_concurrent_401s_renew_once() {
    let server = MockServer::start().await;
    mount_profile(&server, "fresh").await;
    Mock::given(method("GET"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({ "token": "fresh" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, "stale");
    let user = h.client.user();
    let (a, b, c) = tokio::join!(user.profile(), user.profile(), user.profile());

    assert_eq!(a.unwrap().name, "Huda");
    assert_eq!(b.unwrap().name, "Huda");
    assert_eq!(c.unwrap().name, "Huda");
    assert_eq!(
        h.store.token().await.unwrap(),
        Some(BearerToken::new("fresh"))
    );
    assert_eq!(h.navigator.0.load(Ordering::SeqCst), 0);
    assert!(!h.client.is_renewing());
}

#[tokio::test]
async fn rejected_renewal_ends_the_session() {
    let server = MockServer::start().await;
    mount_profile(&server, "never").await;
    Mock::given(method("GET"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Refresh token expired" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, "stale");
    let error = h.client.user().profile().await.unwrap_err();

    assert!(error.is_unauthorized());
    assert_eq!(error.to_string(), "HTTP 401: Refresh token expired");
    assert!(h.store.entries().await.unwrap().is_empty());
    assert_eq!(h.navigator.0.load(Ordering::SeqCst), 1);
}
