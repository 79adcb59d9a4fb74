mod memory;
mod repo;
mod repo_types;
mod store;

pub use memory::MemoryAccountStore;
pub use repo::PgAccountStore;
pub use repo_types::{Account, AccountPatch, NewAccount, PublicAccount, DEFAULT_PROFILE_PICTURE};
pub use store::{AccountPage, AccountQuery, AccountStore, StoreError, UniqueField};
