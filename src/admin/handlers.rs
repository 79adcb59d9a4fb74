use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateUserRequest, DashboardQuery, DashboardResponse, EditUserRequest},
    services,
};
use crate::{
    accounts::Account,
    auth::{AdminUser, MessageResponse},
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/add-user", post(add_user))
        .route("/admin/edit-user/:id", put(edit_user))
        .route("/admin/delete-user/:id", delete(delete_user))
}

#[instrument(skip(state, _admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(query): AppQuery<DashboardQuery>,
) -> AppResult<Json<DashboardResponse>> {
    let page = services::list_accounts(state.store.as_ref(), query).await?;
    Ok(Json(page))
}

#[instrument(skip(state, _admin, payload))]
pub async fn add_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<Account>)> {
    let account = services::create_account(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[instrument(skip(state, admin, payload))]
pub async fn edit_user(
    State(state): State<AppState>,
    admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<EditUserRequest>,
) -> AppResult<Json<Account>> {
    let account = services::edit_account(state.store.as_ref(), admin, id, payload).await?;
    Ok(Json(account))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    services::delete_account(state.store.as_ref(), admin, id).await?;
    Ok(Json(MessageResponse::ok("User deleted successfully.")))
}
