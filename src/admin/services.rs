use axum::http::StatusCode;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CreateUserRequest, DashboardQuery, DashboardResponse, EditUserRequest},
    pagination::{total_pages, PageRequest},
};
use crate::{
    accounts::{
        Account, AccountQuery, AccountStore, NewAccount, StoreError, UniqueField,
        DEFAULT_PROFILE_PICTURE,
    },
    auth::{
        password::hash_password,
        services::{checked_email, non_blank},
        AdminUser,
    },
    error::{AppError, AppResult},
    users::services::profile_patch,
};

pub async fn list_accounts(store: &dyn AccountStore, query: DashboardQuery) -> AppResult<DashboardResponse> {
    let window = PageRequest::from_raw(query.page.as_deref(), query.limit.as_deref());
    let page = store
        .search(&AccountQuery {
            search: non_blank(query.search),
            offset: window.offset(),
            limit: window.limit,
        })
        .await?;

    Ok(DashboardResponse {
        users: page.accounts,
        current_page: window.page,
        total_pages: total_pages(page.total, window.limit),
        total_users: page.total,
        limit: window.limit,
    })
}

pub async fn create_account(store: &dyn AccountStore, req: CreateUserRequest) -> AppResult<Account> {
    let (Some(username), Some(email), Some(password)) = (
        non_blank(req.username),
        non_blank(req.email),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::MissingFields);
    };
    let email = checked_email(&email)?;

    const TAKEN: &str = "User with this email already exists.";
    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "admin create with taken email");
        return Err(AppError::conflict(TAKEN));
    }

    let account = store
        .insert(NewAccount {
            username,
            email,
            password_hash: hash_password(&password)?,
            is_admin: req.is_admin.unwrap_or(false),
            profile_picture: non_blank(req.profile_picture)
                .unwrap_or_else(|| DEFAULT_PROFILE_PICTURE.into()),
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate {
                field: UniqueField::Email,
            } => AppError::conflict(TAKEN),
            other => other.into(),
        })?;

    info!(account_id = %account.id, is_admin = account.is_admin, "account created by admin");
    Ok(account)
}

pub async fn edit_account(
    store: &dyn AccountStore,
    admin: AdminUser,
    target: Uuid,
    req: EditUserRequest,
) -> AppResult<Account> {
    if admin.id == target {
        warn!(account_id = %admin.id, "admin tried to edit itself");
        return Err(AppError::forbidden(
            "Forbidden: Admins cannot modify their own user data using this portal.",
        ));
    }

    let mut patch = profile_patch(req.username, req.email, req.password, req.profile_picture)?;
    patch.is_admin = req.is_admin;

    let (email, username) = (patch.email.clone(), patch.username.clone());

    let account = store
        .update(target, patch)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate { field } => {
                let value = match field {
                    UniqueField::Email => email,
                    UniqueField::Username => username,
                };
                AppError::Conflict {
                    status: StatusCode::BAD_REQUEST,
                    message: format!(
                        "The {} \"{}\" is already taken.",
                        field.as_str(),
                        value.unwrap_or_default()
                    ),
                }
            }
            other => other.into(),
        })?
        .ok_or_else(|| AppError::NotFound("User not found.".into()))?;

    info!(account_id = %account.id, admin = %admin.id, "account edited by admin");
    Ok(account)
}

pub async fn delete_account(store: &dyn AccountStore, admin: AdminUser, target: Uuid) -> AppResult<()> {
    if admin.id == target {
        warn!(account_id = %admin.id, "admin tried to delete itself");
        return Err(AppError::forbidden(
            "Forbidden: Admins cannot delete their own account.",
        ));
    }

    if !store.delete(target).await? {
        return Err(AppError::NotFound("User not found.".into()));
    }

    info!(account_id = %target, admin = %admin.id, "account deleted by admin");
    Ok(())
}
