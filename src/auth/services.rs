use lazy_static::lazy_static;
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{GoogleRequest, LoginRequest, SignupRequest},
    jwt::JwtKeys,
    password::{hash_password, random_password, verify_password},
};
use crate::{
    accounts::{Account, AccountStore, NewAccount, DEFAULT_PROFILE_PICTURE},
    error::{AppError, AppResult},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trims the value and drops it when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Checked and normalized email, or a validation error.
pub(crate) fn checked_email(raw: &str) -> AppResult<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(email)
}

pub async fn signup(store: &dyn AccountStore, req: SignupRequest) -> AppResult<Account> {
    let (Some(username), Some(email), Some(password)) = (
        non_blank(req.username),
        non_blank(req.email),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::MissingFields);
    };
    let email = checked_email(&email)?;

    let account = store
        .insert(NewAccount {
            username,
            email,
            password_hash: hash_password(&password)?,
            is_admin: false,
            profile_picture: DEFAULT_PROFILE_PICTURE.into(),
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "signup rejected by store");
            AppError::from(e)
        })?;

    info!(account_id = %account.id, "account signed up");
    Ok(account)
}

/// Looks up the account and checks the password. Issuing the cookie is left
/// to the caller.
pub async fn login(store: &dyn AccountStore, req: LoginRequest) -> AppResult<Account> {
    let email = normalize_email(&req.email);

    let Some(account) = store.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::NotFound("User not found".into()));
    };

    if !verify_password(&req.password, &account.password_hash)? {
        warn!(account_id = %account.id, "login invalid password");
        return Err(AppError::Unauthenticated("Wrong credentials".into()));
    }

    info!(account_id = %account.id, "account logged in");
    Ok(account)
}

/// Upsert-then-login for identities vouched for by the external provider.
pub async fn federated_login(store: &dyn AccountStore, req: GoogleRequest) -> AppResult<Account> {
    let email = checked_email(&req.email)?;

    if let Some(account) = store.find_by_email(&email).await? {
        info!(account_id = %account.id, "federated login");
        return Ok(account);
    }

    let account = store
        .insert(NewAccount {
            username: federated_username(req.name.as_deref(), &email),
            email,
            password_hash: hash_password(&random_password())?,
            is_admin: false,
            profile_picture: non_blank(req.photo).unwrap_or_else(|| DEFAULT_PROFILE_PICTURE.into()),
        })
        .await?;

    info!(account_id = %account.id, "federated account provisioned");
    Ok(account)
}

/// Display name squashed to lower case without whitespace, plus a short
/// random suffix. Falls back to the email's local part.
pub(crate) fn federated_username(display_name: Option<&str>, email: &str) -> String {
    let base: String = display_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email))
        .split_whitespace()
        .collect::<String>()
        .to_lowercase();
    let suffix: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("{base}{suffix}")
}
