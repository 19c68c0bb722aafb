#![allow(clippy::unwrap_used)]
// Integration tests for `Session` login/refresh/logout flows.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bizdash_api::ApiClient;
use bizdash_core::{MemoryVault, Session, SessionVault};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Session, Arc<MemoryVault>) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url, Duration::from_secs(8));
    let vault = Arc::new(MemoryVault::default());
    let session = Session::new(Arc::new(client), vault.clone());
    (server, session, vault)
}

fn password(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({ "username": "admin", "password": "admin123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "acc-1",
            "refresh": "ref-1",
            "role": "admin",
            "name": "Administrator"
        })))
        .mount(server)
        .await;
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_establishes_session() {
    let (server, session, vault) = setup().await;
    mount_login(&server).await;

    let outcome = session.login("admin", &password("admin123")).await;

    assert!(outcome.success, "{outcome:?}");
    let user = session.user().unwrap();
    assert_eq!(user.role, "admin");
    assert_eq!(user.name, "Administrator");
    assert_eq!(user.email, "admin@company.com");
    assert!(session.client().has_bearer());
    assert_eq!(vault.load().unwrap().access, "acc-1");
}

#[tokio::test]
async fn test_login_without_access_is_invalid_credentials() {
    let (server, session, _vault) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "detail": "no" })))
        .mount(&server)
        .await;

    let outcome = session.login("admin", &password("x")).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Invalid credentials"));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_http_error_surfaces_message() {
    let (server, session, _vault) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let outcome = session.login("admin", &password("bad")).await;
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("HTTP error! status: 401"));
}

#[tokio::test]
async fn test_bearer_is_sent_after_login() {
    let (server, session, _vault) = setup().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/employees/"))
        .and(header("authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    session.login("admin", &password("admin123")).await;
    session.client().get("/employees/").await.unwrap();
}

// ── Persistence ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_init_restores_persisted_session() {
    let (server, session, vault) = setup().await;
    mount_login(&server).await;
    session.login("admin", &password("admin123")).await;

    let client = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse(&format!("{}/api", server.uri())).unwrap(),
        Duration::from_secs(8),
    );
    let restored = Session::new(Arc::new(client), vault);

    assert!(!restored.is_authenticated());
    assert!(restored.init());
    assert!(restored.is_authenticated());
    assert!(restored.client().has_bearer());
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let (server, session, vault) = setup().await;
    mount_login(&server).await;
    session.login("admin", &password("admin123")).await;

    let mut watcher = session.subscribe();
    session.logout();

    assert!(!session.is_authenticated());
    assert!(!session.client().has_bearer());
    assert!(vault.load().is_none());
    assert!(watcher.has_changed().unwrap());
    assert!(watcher.borrow_and_update().is_none());
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_updates_access_token() {
    let (server, session, vault) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_json(json!({ "refresh": "ref-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "acc-2" })))
        .expect(1)
        .mount(&server)
        .await;

    session.login("admin", &password("admin123")).await;
    assert!(session.refresh_token().await);

    let user = session.user().unwrap();
    assert_eq!(user.access, "acc-2");
    assert_eq!(user.refresh.as_deref(), Some("ref-1"));
    assert_eq!(vault.load().unwrap().access, "acc-2");
}

#[tokio::test]
async fn test_refresh_failure_invalidates_session() {
    let (server, session, vault) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    session.login("admin", &password("admin123")).await;
    assert!(!session.refresh_token().await);
    assert!(!session.is_authenticated());
    assert!(vault.load().is_none());
}

#[tokio::test]
async fn test_refresh_without_session_is_false() {
    let (_server, session, _vault) = setup().await;
    assert!(!session.refresh_token().await);
}
