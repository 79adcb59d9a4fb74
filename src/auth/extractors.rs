use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tower_cookies::Cookies;
use tracing::{error, warn};
use uuid::Uuid;

use super::{jwt::JwtKeys, session::SESSION_COOKIE};
use crate::error::AppError;

/// Identity decoded from a valid session cookie. No store lookup is made, so
/// a deleted account keeps passing until its token expires.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub is_admin: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| {
                error!(%status, msg, "cookie layer missing");
                AppError::Internal(anyhow::anyhow!(msg))
            })?;

        let token = cookies
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthenticated("You need to login".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired session token");
            AppError::InvalidToken
        })?;

        Ok(AuthUser {
            id: claims.sub,
            is_admin: claims.is_admin,
        })
    }
}

/// Session whose token carries the elevated role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser {
    pub id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            warn!(account_id = %user.id, "admin route denied");
            return Err(AppError::forbidden("Access denied: Admins only."));
        }
        Ok(AdminUser { id: user.id })
    }
}
