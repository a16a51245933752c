use async_trait::async_trait;

use crate::error::CacheError;

/// A session-scoped key/value store holding serialized cache entries.
///
/// Stores are shared between resources through `Arc<dyn KvStore>`. They have no
/// removal, expiry or eviction: an entry lives as long as the store does.
/// Individual `get`/`set` calls must be atomic, but nothing else is required;
/// callers that check-then-write get no arbitration from the store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// A name for tracing.
    ///
    /// # Example
    /// - "session"
    /// - "moka"
    fn name(&self) -> &'static str;

    /// Return the stored value.
    ///
    /// The response must be `None` for missing keys.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store the value under the given key, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;
}
