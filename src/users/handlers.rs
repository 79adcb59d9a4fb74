use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use tower_cookies::Cookies;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{dto::SelfUpdateRequest, services};
use crate::{
    accounts::PublicAccount,
    auth::{session::clear_session, AuthUser, MessageResponse},
    error::AppResult,
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/update/:id", put(update_user))
        .route("/user/logout", post(logout))
        .route("/user/me", get(me))
}

#[instrument(skip(state, user, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<SelfUpdateRequest>,
) -> AppResult<Json<PublicAccount>> {
    let account = services::update_own_account(state.store.as_ref(), id, user, payload).await?;
    Ok(Json(account))
}

#[instrument(skip(cookies))]
pub async fn logout(cookies: Cookies) -> Json<MessageResponse> {
    clear_session(&cookies);
    info!("session cleared");
    Json(MessageResponse::ok("Logout successful"))
}

#[instrument(skip(state, user))]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<PublicAccount>> {
    let account = services::current_account(state.store.as_ref(), user).await?;
    Ok(Json(account))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use serde_json::json;

    use crate::testing::{send, send_json, TestApp};

    #[tokio::test]
    async fn update_requires_session_cookie() {
        let app = TestApp::new();
        let a = app.seed("alice", "a@x.com", "secret1", false).await;
        let (status, _, body) = send_json(
            &app.router,
            "PUT",
            &format!("/user/update/{}", a.id),
            None,
            json!({"profilePicture": "https://img/a.png"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "You need to login");
    }

    #[tokio::test]
    async fn tampered_token_is_forbidden() {
        let app = TestApp::new();
        let a = app.seed("alice", "a@x.com", "secret1", false).await;
        let cookie = format!("{}x", app.cookie_for(a.id, false));
        let (status, _, body) = send(&app.router, "GET", "/user/me", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Token Invalid");
    }

    #[tokio::test]
    async fn owner_updates_avatar() {
        let app = TestApp::new();
        let a = app.seed("alice", "a@x.com", "secret1", false).await;
        let cookie = app.cookie_for(a.id, false);
        let (status, _, body) = send_json(
            &app.router,
            "PUT",
            &format!("/user/update/{}", a.id),
            Some(&cookie),
            json!({"profilePicture": "https://img/a.png"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profilePicture"], "https://img/a.png");
        assert!(!body.to_string().contains("argon2"));
    }

    #[tokio::test]
    async fn cannot_update_someone_else() {
        let app = TestApp::new();
        let a = app.seed("alice", "a@x.com", "secret1", false).await;
        let b = app.seed("bob", "b@x.com", "secret2", false).await;
        let cookie = app.cookie_for(a.id, false);
        let (status, _, body) = send_json(
            &app.router,
            "PUT",
            &format!("/user/update/{}", b.id),
            Some(&cookie),
            json!({"username": "mallory"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "You can update only your account");
    }

    #[tokio::test]
    async fn self_update_cannot_grant_admin() {
        let app = TestApp::new();
        let a = app.seed("alice", "a@x.com", "secret1", false).await;
        let cookie = app.cookie_for(a.id, false);
        let (status, _, _) = send_json(
            &app.router,
            "PUT",
            &format!("/user/update/{}", a.id),
            Some(&cookie),
            json!({"isAdmin": true}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let stored = app.state.store.find_by_id(a.id).await.unwrap().unwrap();
        assert!(!stored.is_admin);
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let app = TestApp::new();
        let a = app.seed("alice", "a@x.com", "secret1", false).await;
        let cookie = app.cookie_for(a.id, false);
        let (status, _, body) = send_json(
            &app.router,
            "PUT",
            "/user/update/not-a-uuid",
            Some(&cookie),
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
    }

    #[tokio::test]
    async fn me_returns_current_account() {
        let app = TestApp::new();
        let a = app.seed("alice", "a@x.com", "secret1", true).await;
        let cookie = app.cookie_for(a.id, true);
        let (status, _, body) = send(&app.router, "GET", "/user/me", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "a@x.com");
        assert_eq!(body["isAdmin"], true);
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let app = TestApp::new();
        let a = app.seed("alice", "a@x.com", "secret1", false).await;
        let cookie = app.cookie_for(a.id, false);
        let (status, headers, body) =
            send(&app.router, "POST", "/user/logout", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logout successful");
        let removal = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("access_token="))
            .expect("removal cookie");
        assert!(removal.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn logout_without_session_still_succeeds() {
        let app = TestApp::new();
        let (status, _, body) = send(&app.router, "POST", "/user/logout", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
}
