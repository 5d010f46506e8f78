//! End-to-end session flows: views, auth state and route gate against a mock
//! server.

use std::sync::Arc;

use educonnect_core::api::ApiClient;
use educonnect_core::auth::{
    AuthController, AuthState, FileSessionStore, MemoryStorage, SessionStore,
};
use educonnect_core::models::Token;
use educonnect_core::nav::{Navigator, Router, View};
use educonnect_core::views::{DashboardView, LoginView, ResourceKind, UploadView};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn logged_out(storage: &MemoryStorage) -> AuthController {
    AuthController::new(Arc::new(storage.open_context()))
}

fn logged_in(storage: &MemoryStorage, token: &str) -> AuthController {
    storage.open_context().set(&Token::new(token)).unwrap();
    AuthController::new(Arc::new(storage.open_context()))
}

#[tokio::test]
async fn test_protected_view_without_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut auth = logged_out(&MemoryStorage::new());
    let mut router = Router::new(View::Dashboard);
    let mut dashboard = DashboardView::default();

    dashboard.load(&api, &mut auth, &mut router).await;

    assert_eq!(router.current(), View::Login);
    assert!(dashboard.user().is_none());
}

#[tokio::test]
async fn test_login_stores_token_and_opens_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let storage = MemoryStorage::new();
    let mut auth = logged_out(&storage);
    let mut router = Router::new(View::Login);
    let mut login = LoginView::new(Some("ada@example.com".to_string()));
    login.password = "hunter2".to_string();

    assert!(login.submit(&api, &mut auth, &mut router).await);

    assert_eq!(storage.open_context().get(), Some(Token::new("abc")));
    assert_eq!(auth.state(), AuthState::Authenticated);
    assert_eq!(router.current(), View::Dashboard);
    assert_eq!(router.history(), [View::Login, View::Dashboard]);
}

#[tokio::test]
async fn test_wrong_password_shows_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let storage = MemoryStorage::new();
    let mut auth = logged_out(&storage);
    let mut router = Router::new(View::Login);
    let mut login = LoginView::new(Some("ada@example.com".to_string()));
    login.password = "wrong".to_string();

    assert!(!login.submit(&api, &mut auth, &mut router).await);
    assert_eq!(login.error.as_deref(), Some("Invalid credentials"));
    assert_eq!(router.current(), View::Login);
    assert_eq!(storage.open_context().get(), None);
}

#[tokio::test]
async fn test_stale_token_on_dashboard_logs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let storage = MemoryStorage::new();
    let mut auth = logged_in(&storage, "stale");
    let mut router = Router::new(View::Dashboard);
    let mut dashboard = DashboardView::default();

    dashboard.load(&api, &mut auth, &mut router).await;

    assert_eq!(storage.open_context().get(), None);
    assert_eq!(auth.state(), AuthState::Unauthenticated);
    assert_eq!(router.current(), View::Login);
    assert!(dashboard.user().is_none());
}

#[tokio::test]
async fn test_dashboard_renders_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"name": "Ada"}})))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut auth = logged_in(&MemoryStorage::new(), "abc");
    let mut router = Router::new(View::Dashboard);
    let mut dashboard = DashboardView::default();

    dashboard.load(&api, &mut auth, &mut router).await;
    assert_eq!(dashboard.user().map(|u| u.name.as_str()), Some("Ada"));
    assert_eq!(router.current(), View::Dashboard);
}

fn link_upload() -> UploadView {
    let mut upload = UploadView::default();
    upload.title = "Rust notes".to_string();
    upload.kind = ResourceKind::Link;
    upload.url = "https://example.com/notes".to_string();
    upload
}

#[tokio::test]
async fn test_upload_without_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/materials"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut auth = logged_out(&MemoryStorage::new());
    let mut router = Router::new(View::Upload);
    let mut upload = link_upload();

    upload.submit(&api, &mut auth, &mut router).await;
    assert_eq!(router.current(), View::Login);
}

#[tokio::test]
async fn test_upload_rejected_token_logs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/materials"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let storage = MemoryStorage::new();
    let mut auth = logged_in(&storage, "abc");
    let mut router = Router::new(View::Upload);
    let mut upload = link_upload();

    upload.submit(&api, &mut auth, &mut router).await;
    assert_eq!(auth.state(), AuthState::Unauthenticated);
    assert_eq!(storage.open_context().get(), None);
    assert_eq!(router.current(), View::Login);
}

#[test]
fn test_logout_in_one_instance_reaches_another() {
    let dir = TempDir::new().unwrap();
    let store_a = Arc::new(FileSessionStore::new(dir.path()));
    let store_b = Arc::new(FileSessionStore::new(dir.path()));

    let mut auth_a = AuthController::new(store_a.clone());
    auth_a.login_succeeded(&Token::new("abc")).unwrap();

    let mut auth_b = AuthController::new(store_b.clone());
    assert!(auth_b.is_authenticated());
    let mut router_a = Router::new(View::Dashboard);
    let mut router_b = Router::new(View::Upload);

    auth_a.logout(&mut router_a);
    assert!(store_b.poll_disk().is_some());
    assert!(auth_b.sync_external(&mut router_b));

    assert_eq!(auth_b.state(), AuthState::Unauthenticated);
    assert_eq!(router_b.current(), View::Login);
    assert_eq!(store_b.get(), None);
}
