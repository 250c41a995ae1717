//! Fixtures shared by route tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use easyjw_core::identity::{HashedStudentId, StudentIdHasher};
use easyjw_db::migration::{Migrator, MigratorTrait};
use easyjw_portal::{CaptchaError, CaptchaSolver, PortalClient, PortalConfig, PortalCookies};
use easyjw_shared::{InMemoryRevocationStore, JwtConfig, JwtService, TokenPair};
use http_body_util::BodyExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{AppState, create_router};

pub(crate) const STUDENT_ID: &str = "2021416001";
pub(crate) const CLIENT_IP: &str = "203.0.113.7";

pub(crate) const GRADE_PAGE: &str = r#"<table id="dataList">
    <tr><th>序号</th><th>开课学期</th><th>课程编号</th><th>课程名称</th><th>学分</th><th>绩点</th></tr>
    <tr><td>1</td><td>2023-2024-1</td><td>MA101</td><td>Calculus</td><td>4</td><td>1.0</td></tr>
    <tr><td>2</td><td>2023-2024-2</td><td>MA101</td><td>Calculus</td><td>4</td><td>3.5</td></tr>
    <tr><td>3</td><td>2023-2024-2</td><td>EN101</td><td>English</td><td>2</td><td>4.0</td></tr>
</table>"#;

/// Solver that always reads the same four characters.
pub(crate) struct FixedSolver;

#[async_trait]
impl CaptchaSolver for FixedSolver {
    async fn classify(&self, _image: &[u8]) -> Result<String, CaptchaError> {
        Ok("abcd".to_string())
    }
}

/// State backed by in-memory `SQLite` and a portal at `portal_url`.
pub(crate) async fn test_state(portal_url: &str) -> AppState {
    let db = easyjw_db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let jwt_service = JwtService::new(
        JwtConfig {
            secret: "route-test-secret-0123456789abcdef".to_string(),
            access_token_expires_minutes: 60,
            refresh_token_expires_days: 7,
            bind_client_ip: true,
        },
        Arc::new(InMemoryRevocationStore::new()),
    )
    .expect("should build jwt service");

    let portal = PortalClient::new(
        PortalConfig {
            max_retries: 2,
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..PortalConfig::with_base_url(portal_url)
        },
        Arc::new(FixedSolver),
    );

    AppState::new(db, jwt_service, portal, StudentIdHasher::new("route-test-salt"))
}

pub(crate) fn app(state: AppState) -> Router {
    create_router(state)
}

/// Hashed id of [`STUDENT_ID`].
pub(crate) fn student(state: &AppState) -> HashedStudentId {
    state.hasher.hash(STUDENT_ID).expect("should hash")
}

/// Issues tokens for [`STUDENT_ID`] bound to [`CLIENT_IP`].
pub(crate) fn tokens(state: &AppState) -> TokenPair {
    state
        .jwt_service
        .issue_pair(student(state).as_str(), Some(CLIENT_IP))
        .expect("should issue tokens")
}

/// Stores a portal session for [`STUDENT_ID`].
pub(crate) async fn store_session(state: &AppState) {
    let mut cookies = PortalCookies::default();
    cookies.insert("JSESSIONID", "STORED");
    state
        .sessions
        .save(&student(state), &cookies)
        .await
        .expect("should save session");
}

pub(crate) fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("X-Forwarded-For", CLIENT_IP)
        .body(Body::empty())
        .unwrap()
}

pub(crate) fn post_json(uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("X-Forwarded-For", CLIENT_IP);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub(crate) async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("should read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be json")
}

/// Mounts a portal that accepts any login.
pub(crate) async fn mount_portal_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/jsxsd/verifycode.servlet"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "JSESSIONID=FRESH; Path=/")
                .set_body_bytes(vec![0u8; 256]),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/jsxsd/xk/LoginToXkLdap"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jsxsd/framework/xsMain.jsp"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>教学一体化服务平台</title>"))
        .mount(server)
        .await;
}
