use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::CacheError;
use crate::store::KvStore;

/// Configuration for SessionStore.
#[derive(Debug, Clone, Default)]
pub struct SessionStoreConfig {
    /// Number of entries to reserve space for up front.
    pub initial_capacity: usize,
}

/// In-memory session store using HashMap with RwLock.
///
/// Entries live until the store is dropped, which marks the end of the
/// session. Share one store between resources by wrapping it in an `Arc`.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    /// Create a new SessionStore with the given configuration.
    pub fn new(config: SessionStoreConfig) -> Self {
        SessionStore {
            state: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
        }
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }
}

#[async_trait]
impl KvStore for SessionStore {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let state = self.state.read().await;
        Ok(state.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.insert(key.to_string(), value);
        Ok(())
    }
}
