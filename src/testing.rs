//! Router-level test helpers: drive the real app with `oneshot` against the
//! in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    accounts::{Account, NewAccount, DEFAULT_PROFILE_PICTURE},
    app::build_app,
    auth::{jwt::JwtKeys, password::hash_password, session::SESSION_COOKIE},
    state::AppState,
};

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::from_state(AppState::fake())
    }

    /// App whose store rejects a second account with the same username.
    pub fn with_unique_usernames() -> Self {
        Self::from_state(AppState::fake_with_username_policy(true))
    }

    fn from_state(state: AppState) -> Self {
        let router = build_app(state.clone());
        Self { state, router }
    }

    pub async fn seed(&self, username: &str, email: &str, password: &str, is_admin: bool) -> Account {
        self.state
            .store
            .insert(NewAccount {
                username: username.into(),
                email: email.into(),
                password_hash: hash_password(password).expect("hash"),
                is_admin,
                profile_picture: DEFAULT_PROFILE_PICTURE.into(),
            })
            .await
            .expect("seed account")
    }

    /// `Cookie` header value for a session signed with the app's own keys.
    pub fn cookie_for(&self, id: Uuid, is_admin: bool) -> String {
        let token = JwtKeys::from(&self.state.config.jwt)
            .sign(id, is_admin)
            .expect("sign");
        format!("{SESSION_COOKIE}={token}")
    }
}

pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder()
        .method(Method::from_bytes(method.as_bytes()).expect("method"))
        .uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, headers, json)
}

pub async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Value,
) -> (StatusCode, HeaderMap, Value) {
    send(router, method, uri, cookie, Some(body)).await
}

/// Value of a non-empty `access_token` set by the response, if any.
pub fn session_cookie_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix(&format!("{SESSION_COOKIE}=")).map(str::to_owned))
        .map(|v| v.split(';').next().unwrap_or_default().to_owned())
        .find(|v| !v.is_empty())
}
