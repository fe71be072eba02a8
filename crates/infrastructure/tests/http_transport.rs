//! Transport behavior against a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::time::Duration;

use groupguard_application::{HttpTransport, TransportError};
use groupguard_domain::{ApiRequest, ClientConfig, FormPart, RequestBody};
use groupguard_infrastructure::ReqwestTransport;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> ReqwestTransport {
    ReqwestTransport::new(&ClientConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn sends_json_with_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wa/send-message"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "jid": "1@g.us", "text": "hi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ApiRequest::post("/wa/send-message")
        .with_json(&json!({ "jid": "1@g.us", "text": "hi" }))
        .unwrap();
    let response = transport(&server).execute(&request).await.unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.json_value(), Some(json!({ "success": true })));
}

#[tokio::test]
async fn error_statuses_are_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wa/protection-settings"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "No session" })))
        .mount(&server)
        .await;

    let response = transport(&server)
        .execute(&ApiRequest::get("/wa/protection-settings"))
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 404);
    assert_eq!(response.error_message(), Some("No session".to_string()));
}

#[tokio::test]
async fn encodes_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/violations"))
        .and(query_param("limit", "5"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "violations": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ApiRequest::get("/user/violations")
        .with_query("limit", "5")
        .with_header("Authorization", "Bearer abc");
    let response = transport(&server).execute(&request).await.unwrap();

    assert!(response.is_success());
}

#[tokio::test]
async fn uploads_multipart_with_guessed_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/subscription/s1/invoice"))
        .and(header_regex("content-type", "^multipart/form-data; boundary=.+"))
        .and(body_string_contains("name=\"invoice\"; filename=\"proof.png\""))
        .and(body_string_contains("Content-Type: image/png"))
        .and(body_string_contains("name=\"amount\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ApiRequest::post("/user/subscription/s1/invoice").with_body(
        RequestBody::Multipart(vec![
            FormPart::file("invoice", "proof.png", b"png-bytes".to_vec()),
            FormPart::text("amount", "25"),
        ]),
    );
    let response = transport(&server).execute(&request).await.unwrap();

    assert_eq!(response.status.as_u16(), 201);
}

#[tokio::test]
async fn keeps_cookies_when_credentials_are_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refreshToken=r1; Path=/; HttpOnly")
                .set_body_json(json!({ "token": "t1" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/refresh"))
        .and(header("cookie", "refreshToken=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t2" })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server);
    transport.execute(&ApiRequest::post("/auth/login")).await.unwrap();
    let response = transport.execute(&ApiRequest::get("/auth/refresh")).await.unwrap();

    assert_eq!(response.status.as_u16(), 200);
}

#[tokio::test]
async fn per_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let result = transport(&server)
        .execute(&ApiRequest::get("/slow").with_timeout_ms(50))
        .await;

    assert_eq!(result.unwrap_err(), TransportError::Timeout { timeout_ms: 50 });
}

#[tokio::test]
async fn unreachable_host_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let transport = ReqwestTransport::new(&ClientConfig::new(format!("http://{address}"))).unwrap();
    let result = transport.execute(&ApiRequest::get("/user/profile")).await;

    assert!(
        matches!(
            result,
            Err(TransportError::ConnectionRefused { .. } | TransportError::ConnectionFailed(_))
        ),
        "{result:?}"
    );
}
