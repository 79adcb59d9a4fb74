use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo_types::{Account, AccountPatch, NewAccount};
use super::store::{AccountPage, AccountQuery, AccountStore, StoreError, UniqueField};

/// In-process store with the same uniqueness rules as the PostgreSQL schema.
/// Selected with `DATABASE_URL=memory://`; contents are lost on restart.
pub struct MemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
    username_unique: bool,
}

impl MemoryAccountStore {
    pub fn new(username_unique: bool) -> Self {
        Self {
            accounts: RwLock::new(Vec::new()),
            username_unique,
        }
    }

    fn check_unique(
        &self,
        accounts: &[Account],
        skip: Option<Uuid>,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), StoreError> {
        let others = accounts.iter().filter(|a| Some(a.id) != skip);
        for other in others {
            if email.is_some_and(|e| e == other.email) {
                return Err(StoreError::Duplicate {
                    field: UniqueField::Email,
                });
            }
            if self.username_unique && username.is_some_and(|u| u == other.username) {
                return Err(StoreError::Duplicate {
                    field: UniqueField::Username,
                });
            }
        }
        Ok(())
    }
}

fn matches_search(account: &Account, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(n) => {
            account.username.to_lowercase().contains(n) || account.email.to_lowercase().contains(n)
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        self.check_unique(
            &accounts,
            None,
            Some(&account.email),
            Some(&account.username),
        )?;
        // Keep creation times strictly increasing so listing order is insertion order.
        let mut now = OffsetDateTime::now_utc();
        if let Some(last) = accounts.iter().map(|a| a.created_at).max() {
            now = now.max(last + time::Duration::microseconds(1));
        }
        let record = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            is_admin: account.is_admin,
            profile_picture: account.profile_picture,
            created_at: now,
            updated_at: now,
        };
        accounts.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn update(&self, id: Uuid, patch: AccountPatch) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.write().await;
        if !accounts.iter().any(|a| a.id == id) {
            return Ok(None);
        }
        self.check_unique(
            &accounts,
            Some(id),
            patch.email.as_deref(),
            patch.username.as_deref(),
        )?;
        let Some(account) = accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        patch.apply(account);
        account.updated_at = OffsetDateTime::now_utc();
        Ok(Some(account.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok(accounts.len() < before)
    }

    async fn search(&self, query: &AccountQuery) -> Result<AccountPage, StoreError> {
        let accounts = self.accounts.read().await;
        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut matching: Vec<&Account> = accounts
            .iter()
            .filter(|a| matches_search(a, needle.as_deref()))
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let offset = usize::try_from(query.offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit.max(0)).unwrap_or(usize::MAX);
        let accounts = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(AccountPage { accounts, total })
    }
}
