//! # Collection Managers
//!
//! Entity-specific operations over the shared [`RecordStore`]. Every write
//! performs its checks and its change inside one exclusive critical section.

pub mod posts;
pub mod refresh_tokens;
pub mod users;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::store::{RecordStore, StoreResult};

pub use posts::{ListOptions, PostsManager, SortOrder};
pub use refresh_tokens::{RefreshTokenManager, DEFAULT_TTL_DAYS, MAX_TTL_DAYS};
pub use users::{UsersManager, UPGRADE_EVENT};

/// All three managers wired to one store
pub struct Collections {
    pub store: Arc<RecordStore>,
    pub posts: PostsManager,
    pub users: UsersManager,
    pub refresh_tokens: RefreshTokenManager,
}

impl Collections {
    /// Open (or create) the document named by `config` and build the managers
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let store = Arc::new(RecordStore::open(&config.database_path)?);
        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: Arc<RecordStore>, config: &StoreConfig) -> Self {
        Self {
            posts: PostsManager::new(store.clone(), config.content.clone()),
            users: UsersManager::new(store.clone()),
            refresh_tokens: RefreshTokenManager::new(store.clone(), config.refresh_token_ttl()),
            store,
        }
    }
}
