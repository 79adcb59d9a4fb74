use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
mod pagination;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::admin_routes())
}
