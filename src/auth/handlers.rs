use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tower_cookies::Cookies;
use tracing::instrument;

use super::{
    dto::{GoogleRequest, LoginRequest, MessageResponse, SessionResponse, SignupRequest},
    jwt::JwtKeys,
    services,
    session::session_cookie,
};
use crate::{
    accounts::Account,
    error::AppResult,
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/google", post(google))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    services::signup(state.store.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok("User created successfully")),
    ))
}

#[instrument(skip(state, cookies, payload))]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<SessionResponse>> {
    let account = services::login(state.store.as_ref(), payload).await?;
    start_session(&state, &cookies, account, "Login successful")
}

#[instrument(skip(state, cookies, payload))]
pub async fn google(
    State(state): State<AppState>,
    cookies: Cookies,
    AppJson(payload): AppJson<GoogleRequest>,
) -> AppResult<Json<SessionResponse>> {
    let account = services::federated_login(state.store.as_ref(), payload).await?;
    start_session(&state, &cookies, account, "Login successful")
}

fn start_session(
    state: &AppState,
    cookies: &Cookies,
    account: Account,
    message: &str,
) -> AppResult<Json<SessionResponse>> {
    let keys = JwtKeys::from(&state.config.jwt);
    let token = keys.sign(account.id, account.is_admin)?;
    cookies.add(session_cookie(token, &state.config));
    Ok(Json(SessionResponse {
        success: true,
        message: message.to_owned(),
        account: account.into(),
    }))
}
