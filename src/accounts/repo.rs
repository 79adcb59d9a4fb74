use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::repo_types::{Account, AccountPatch, NewAccount};
use super::store::{AccountPage, AccountQuery, AccountStore, StoreError, UniqueField};

/// PostgreSQL-backed account store.
#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    /// Connects, runs migrations and applies the username uniqueness policy.
    pub async fn connect(database_url: &str, username_unique: bool) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        let store = Self { db };
        store.apply_username_policy(username_unique).await?;
        Ok(store)
    }

    async fn apply_username_policy(&self, unique: bool) -> anyhow::Result<()> {
        let sql = if unique {
            "CREATE UNIQUE INDEX IF NOT EXISTS users_username_key ON users (username)"
        } else {
            "DROP INDEX IF EXISTS users_username_key"
        };
        sqlx::query(sql)
            .execute(&self.db)
            .await
            .context("apply username uniqueness policy")?;
        info!(username_unique = unique, "username uniqueness policy applied");
        Ok(())
    }
}

fn map_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if let Some(field) = db_err.constraint().and_then(UniqueField::from_constraint) {
                return StoreError::Duplicate { field };
            }
        }
    }
    StoreError::Database(e)
}

/// Escapes LIKE metacharacters so the term matches literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let now = OffsetDateTime::now_utc();
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.is_admin)
        .bind(&account.profile_picture)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .map_err(map_err)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_err)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(map_err)
    }

    async fn update(&self, id: Uuid, patch: AccountPatch) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE users SET
                username        = COALESCE($2, username),
                email           = COALESCE($3, email),
                password_hash   = COALESCE($4, password_hash),
                is_admin        = COALESCE($5, is_admin),
                profile_picture = COALESCE($6, profile_picture),
                updated_at      = now()
            WHERE id = $1
            RETURNING id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.username)
        .bind(patch.email)
        .bind(patch.password_hash)
        .bind(patch.is_admin)
        .bind(patch.profile_picture)
        .fetch_optional(&self.db)
        .await
        .map_err(map_err)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(map_err)?;
        Ok(res.rows_affected() > 0)
    }

    async fn search(&self, query: &AccountQuery) -> Result<AccountPage, StoreError> {
        let pattern = query.search.as_deref().map(like_pattern);

        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
            FROM users
            WHERE ($1::text IS NULL OR username ILIKE $1 OR email ILIKE $1)
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern.as_deref())
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.db)
        .await
        .map_err(map_err)?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE ($1::text IS NULL OR username ILIKE $1 OR email ILIKE $1)
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.db)
        .await
        .map_err(map_err)?;

        Ok(AccountPage { accounts, total })
    }
}
