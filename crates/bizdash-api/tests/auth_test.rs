#![allow(clippy::unwrap_used)]
// Integration tests for the token auth endpoints using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bizdash_api::{ApiClient, Error};

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url, Duration::from_secs(8));
    (server, client)
}

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({ "username": "admin", "password": "admin123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "acc",
            "refresh": "ref",
            "role": "admin"
        })))
        .mount(&server)
        .await;

    let secret = SecretString::from("admin123".to_string());
    let tokens = client.login("admin", &secret).await.unwrap();

    assert_eq!(tokens.access.as_deref(), Some("acc"));
    assert_eq!(tokens.refresh.as_deref(), Some("ref"));
    assert_eq!(tokens.role.as_deref(), Some("admin"));
    assert!(tokens.name.is_none());
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "bad" })))
        .mount(&server)
        .await;

    let secret = SecretString::from("wrong".to_string());
    let result = client.login("admin", &secret).await;

    assert!(
        matches!(result, Err(Error::Http { status: 401, .. })),
        "expected 401, got: {result:?}"
    );
}

#[tokio::test]
async fn test_refresh_posts_refresh_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_json(json!({ "refresh": "ref" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "acc2" })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = client
        .refresh(&SecretString::from("ref".to_string()))
        .await
        .unwrap();
    assert_eq!(tokens.access.as_deref(), Some("acc2"));
}
