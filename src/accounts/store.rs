use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{Account, AccountPatch, NewAccount};

/// Columns guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
        }
    }

    /// Maps a violated constraint/index name back to the field it guards.
    pub fn from_constraint(name: &str) -> Option<Self> {
        match name {
            "users_email_key" => Some(Self::Email),
            "users_username_key" => Some(Self::Username),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{} already exists", .field.as_str())]
    Duplicate { field: UniqueField },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Filter and window for a listing. `search` is matched as a literal,
/// case-insensitive substring of username or email.
#[derive(Debug, Clone, Default)]
pub struct AccountQuery {
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone)]
pub struct AccountPage {
    pub accounts: Vec<Account>,
    /// Number of accounts matching the filter, ignoring the window.
    pub total: i64,
}

/// Persistence seam for accounts. Results are ordered by `created_at`, then `id`.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    /// Returns `None` when no account has that id.
    async fn update(&self, id: Uuid, patch: AccountPatch) -> Result<Option<Account>, StoreError>;
    /// Returns `false` when no account has that id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn search(&self, query: &AccountQuery) -> Result<AccountPage, StoreError>;
}
