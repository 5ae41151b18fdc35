//! OAuth handshake and session persistence.

use ridgeline_analytics::auth::{FileTokenStorage, TokenStorage};
use ridgeline_analytics::{AnalyticsClient, AuthorizationReason, ClientConfig, Credentials};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::authorization_of;

#[tokio::test]
async fn test_handshake_then_authorized_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/oauth/request_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=acc-token&oauth_token_secret=acc-secret"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reports"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"reports": []}"#))
        .mount(&server)
        .await;

    let client = AnalyticsClient::new(
        format!("{}/api", server.uri()),
        Credentials::new("consumer-key", "consumer-secret"),
    )
    .unwrap();

    let request = client.request_token("https://app.example.com/callback").await.unwrap();
    let url = client.authorization_url(&request.oauth_token).unwrap();
    assert_eq!(url.path(), "/api/oauth/authorize");
    assert_eq!(url.query(), Some("oauth_token=req-token"));

    client.access_token("verifier").await.unwrap();
    client.executor().get_json("reports").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(authorization_of(&requests[2]).contains(r#"oauth_token="acc-token""#));
}

#[tokio::test]
async fn test_expired_token_surfaces_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("oauth_problem=token_expired"))
        .mount(&server)
        .await;

    let client = super::common::authorized_client(&server);
    let err = client.executor().get("reports").await.unwrap_err();
    assert_eq!(
        err.authorization_reason(),
        Some(&AuthorizationReason::TokenExpired)
    );
}

#[tokio::test]
async fn test_session_survives_storage_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let storage = FileTokenStorage::with_path(dir.path());

    let client = super::common::authorized_client(&server);
    storage.save("default", &client.snapshot()).unwrap();

    let snapshot = storage.load("default").unwrap().unwrap();
    let restored = AnalyticsClient::restore(
        &snapshot,
        "consumer-secret",
        format!("{}/api", server.uri()),
        ClientConfig::default(),
    )
    .unwrap();
    restored.executor().get("ping").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(authorization_of(&requests[0]).contains(r#"oauth_token="access-token""#));
    assert!(!serde_json::to_string(&snapshot)
        .unwrap()
        .contains("consumer-secret"));
}
