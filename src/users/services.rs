use axum::http::StatusCode;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::SelfUpdateRequest;
use crate::{
    accounts::{AccountPatch, AccountStore, PublicAccount},
    auth::{
        password::hash_password,
        services::{checked_email, non_blank},
        AuthUser,
    },
    error::{AppError, AppResult},
};

/// Builds a patch from profile fields. Blank values are ignored; a present
/// password is re-hashed, an absent one keeps the stored hash.
pub(crate) fn profile_patch(
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    profile_picture: Option<String>,
) -> AppResult<AccountPatch> {
    let email = non_blank(email).map(|e| checked_email(&e)).transpose()?;
    let password_hash = password
        .filter(|p| !p.is_empty())
        .map(|p| hash_password(&p))
        .transpose()?;
    Ok(AccountPatch {
        username: non_blank(username),
        email,
        password_hash,
        is_admin: None,
        profile_picture: non_blank(profile_picture),
    })
}

pub async fn update_own_account(
    store: &dyn AccountStore,
    account_id: Uuid,
    requester: AuthUser,
    req: SelfUpdateRequest,
) -> AppResult<PublicAccount> {
    if requester.id != account_id {
        warn!(requester = %requester.id, target = %account_id, "self update on foreign account");
        return Err(AppError::Forbidden {
            status: StatusCode::UNAUTHORIZED,
            message: "You can update only your account".into(),
        });
    }

    let patch = profile_patch(req.username, req.email, req.password, req.profile_picture)?;
    let account = store
        .update(account_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!(account_id = %account.id, "profile updated");
    Ok(account.into())
}

pub async fn current_account(store: &dyn AccountStore, requester: AuthUser) -> AppResult<PublicAccount> {
    store
        .find_by_id(requester.id)
        .await?
        .map(PublicAccount::from)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
