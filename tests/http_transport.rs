//! End-to-end checks of `HttpTransport` against a local stub registry.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{Value, json};

use ebuild_client::app::{Action, App, ViewId};
use ebuild_client::config::ClientConfig;
use ebuild_client::net::api::ApiClient;
use ebuild_client::net::transport::{HttpTransport, Transport};
use ebuild_client::net::types::SearchSort;
use ebuild_client::pages::login::LoginForm;
use ebuild_client::state::auth::{BootstrapOutcome, SessionManager};
use ebuild_client::state::session::AuthState;

const REFRESH_COOKIE: &str = "ebuild_refresh";
const CSRF_COOKIE: &str = "ebuild_csrf";

// =============================================================================
// Stub registry
// =============================================================================

fn session_cookies(jar: CookieJar, refresh: &'static str, csrf: &'static str) -> CookieJar {
    jar.add(Cookie::build((REFRESH_COOKIE, refresh)).path("/").http_only(true))
        .add(Cookie::build((CSRF_COOKIE, csrf)).path("/"))
}

fn csrf_matches(jar: &CookieJar, headers: &HeaderMap) -> bool {
    let cookie = jar.get(CSRF_COOKIE).map(Cookie::value).unwrap_or_default();
    let header = headers.get("x-csrf-token").and_then(|v| v.to_str().ok()).unwrap_or_default();
    !cookie.is_empty() && cookie == header
}

async fn login(jar: CookieJar, Json(body): Json<Value>) -> Response {
    if body["username"] != "alice" || body["password"] != "pw" {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid credentials" }))).into_response();
    }
    let jar = session_cookies(jar, "r1", "c1");
    (jar, Json(json!({ "token": "t1", "username": "alice", "csrf": "c1" }))).into_response()
}

async fn refresh(jar: CookieJar, headers: HeaderMap) -> Response {
    let has_refresh = jar.get(REFRESH_COOKIE).is_some_and(|c| !c.value().is_empty());
    if !has_refresh {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "missing refresh cookie" }))).into_response();
    }
    if !csrf_matches(&jar, &headers) {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "csrf mismatch" }))).into_response();
    }
    let jar = session_cookies(jar, "r2", "c2");
    let body = json!({ "token": "t2", "username": "alice", "expires_at": 1_900_000_000, "csrf": "c2" });
    (jar, Json(body)).into_response()
}

async fn revoke(jar: CookieJar, headers: HeaderMap) -> Response {
    if !csrf_matches(&jar, &headers) {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "csrf mismatch" }))).into_response();
    }
    let jar = jar.remove(Cookie::build(REFRESH_COOKIE).path("/"));
    (jar, Json(json!({ "status": "ok" }))).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer t1" | "Bearer t2") => Json(json!({ "id": 1, "username": "alice", "role": "user" })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))).into_response(),
    }
}

async fn search(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    let sort = params.get("sort").cloned().unwrap_or_default();
    let authorized = headers.contains_key("authorization");
    Json(json!({ "results": [{ "id": 1, "name": q, "description": format!("sort={sort} auth={authorized}") }] }))
}

async fn spawn_registry() -> SocketAddr {
    let router = Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/tokens/revoke", post(revoke))
        .route("/me", get(me))
        .route("/search", get(search));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn transport_for(addr: SocketAddr) -> HttpTransport {
    let config = ClientConfig::default().with_base_url(&format!("http://{addr}/")).unwrap();
    HttpTransport::new(&config).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn cookie_jar_exposes_csrf_cookie_after_login() {
    let addr = spawn_registry().await;
    let api = ApiClient::with_service(transport_for(addr), "ebuild");
    assert_eq!(api.csrf_cookie(), None);

    let mut sessions = SessionManager::new(api);
    assert!(sessions.login("alice", "pw").await.is_authenticated());
    assert_eq!(sessions.api().transport().cookie(CSRF_COOKIE).as_deref(), Some("c1"));
    assert_eq!(sessions.api().csrf_cookie().as_deref(), Some("c1"));
}

#[tokio::test]
async fn bearer_header_reaches_server_after_login() {
    let addr = spawn_registry().await;
    let mut sessions = SessionManager::new(ApiClient::with_service(transport_for(addr), "ebuild"));

    let anonymous = sessions.api().me(sessions.session()).await;
    assert_eq!(anonymous.unwrap_err().status(), Some(401));

    assert!(sessions.login("alice", "pw").await.is_authenticated());
    let me = sessions.api().me(sessions.session()).await.unwrap();
    assert_eq!(me.username, "alice");
}

#[tokio::test]
async fn bootstrap_uses_cookie_csrf_after_memory_reset() {
    let addr = spawn_registry().await;
    let mut sessions = SessionManager::new(ApiClient::with_service(transport_for(addr), "ebuild"));
    assert!(sessions.login("alice", "pw").await.is_authenticated());

    sessions.reset();
    assert_eq!(sessions.state(), AuthState::Anonymous);

    let outcome = sessions.bootstrap().await;
    assert!(matches!(outcome, BootstrapOutcome::Authenticated { username: Some(ref u) } if u == "alice"));
    assert_eq!(sessions.session().access_token(), Some("t2"));
    assert_eq!(sessions.session().csrf_token(), Some("c2"));
}

#[tokio::test]
async fn bootstrap_without_cookies_is_anonymous() {
    let addr = spawn_registry().await;
    let mut sessions = SessionManager::new(ApiClient::with_service(transport_for(addr), "ebuild"));

    let outcome = sessions.bootstrap().await;
    assert!(matches!(outcome, BootstrapOutcome::Anonymous { ref reason } if reason.status() == Some(401)));
    assert_eq!(sessions.session().access_token(), None);
}

#[tokio::test]
async fn logout_revokes_refresh_cookie() {
    let addr = spawn_registry().await;
    let mut sessions = SessionManager::new(ApiClient::with_service(transport_for(addr), "ebuild"));
    assert!(sessions.login("alice", "pw").await.is_authenticated());

    let outcome = sessions.logout().await;
    assert_eq!(outcome.revoke.unwrap().status, 200);
    assert_eq!(sessions.state(), AuthState::Anonymous);

    sessions.reset();
    assert!(matches!(sessions.bootstrap().await, BootstrapOutcome::Anonymous { .. }));
}

#[tokio::test]
async fn search_query_is_encoded_and_sent_without_bearer() {
    let addr = spawn_registry().await;
    let mut app = App::new(SessionManager::new(ApiClient::with_service(transport_for(addr), "ebuild")));
    app.mount(ViewId::ALL);

    let login = LoginForm { username: "alice".to_owned(), password: "pw".to_owned() };
    assert!(app.dispatch(Action::Login(login)).await.is_completed());

    let action = Action::Search { query: "foo bar&x".to_owned(), sort: Some(SearchSort::Random) };
    assert!(app.dispatch(action).await.is_completed());

    let entry = &app.ui().search_results[0];
    assert_eq!(entry.name, "foo bar&x");
    assert_eq!(entry.description, "sort=random auth=false");
}
