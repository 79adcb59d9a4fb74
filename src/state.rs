use crate::accounts::{AccountStore, MemoryAccountStore, PgAccountStore};
use crate::config::AppConfig;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = if config.uses_memory_store() {
            warn!("using in-memory account store; data will not survive a restart");
            Arc::new(MemoryAccountStore::new(config.username_unique)) as Arc<dyn AccountStore>
        } else {
            Arc::new(PgAccountStore::connect(&config.database_url, config.username_unique).await?)
                as Arc<dyn AccountStore>
        };

        Ok(Self::from_parts(config, store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn AccountStore>) -> Self {
        Self { config, store }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_username_policy(false)
    }

    #[cfg(test)]
    pub fn fake_with_username_policy(username_unique: bool) -> Self {
        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60,
            },
            cookie_secure: false,
            username_unique,
            host: "127.0.0.1".into(),
            port: 0,
        });
        let store = Arc::new(MemoryAccountStore::new(config.username_unique)) as Arc<dyn AccountStore>;
        Self::from_parts(config, store)
    }
}
