use async_trait::async_trait;
use moka::future::Cache;

use crate::error::CacheError;
use crate::store::KvStore;

/// Configuration for MokaStore.
#[derive(Debug, Clone)]
pub struct MokaStoreConfig {
    /// Number of entries to reserve space for up front.
    pub initial_capacity: usize,
}

impl Default for MokaStoreConfig {
    fn default() -> Self {
        MokaStoreConfig {
            initial_capacity: 1_000,
        }
    }
}

/// Concurrent session store using Moka.
///
/// The cache is built without a capacity limit, time to live or time to idle,
/// so entries are never evicted. Prefer it over `SessionStore` when many
/// resources on a multi-threaded runtime share one store.
pub struct MokaStore {
    cache: Cache<String, String>,
}

impl MokaStore {
    /// Create a new MokaStore with the given configuration.
    ///
    /// # Example
    /// ```ignore
    /// let store = MokaStore::new(MokaStoreConfig { initial_capacity: 64 });
    /// ```
    pub fn new(config: MokaStoreConfig) -> Self {
        let cache = Cache::builder()
            .initial_capacity(config.initial_capacity)
            .build();
        MokaStore { cache }
    }

    /// Approximate number of stored entries.
    ///
    /// Moka updates its counters lazily, so recent writes may not be reflected.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl KvStore for MokaStore {
    fn name(&self) -> &'static str {
        "moka"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.cache.insert(key.to_string(), value).await;
        Ok(())
    }
}
