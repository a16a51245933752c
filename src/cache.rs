use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::store::KvStore;

/// Decides which value a successful fetch surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// The first value ever cached for a key wins.
    ///
    /// A miss writes the fetched value; a hit discards the fetched value and
    /// surfaces the cached copy. The entry is never rewritten.
    #[default]
    WriteOnce,
    /// Every fetch rewrites the entry and surfaces the fetched value.
    Refresh,
}

/// Outcome of [`ResourceCache::resolve_while`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<V> {
    /// The value to publish.
    Surfaced(V),
    /// The caller went away before the store was written.
    Skipped(V),
}

impl<V> Resolution<V> {
    pub fn into_value(self) -> V {
        match self {
            Resolution::Surfaced(value) | Resolution::Skipped(value) => value,
        }
    }
}

/// Typed view over a [`KvStore`] applying a [`CachePolicy`].
///
/// `ResourceCache` handles conversion between `V` and the serialized form kept
/// in the store.
pub struct ResourceCache<V> {
    store: Arc<dyn KvStore>,
    policy: CachePolicy,
    _value: PhantomData<fn() -> V>,
}

impl<V> Clone for ResourceCache<V> {
    fn clone(&self) -> Self {
        ResourceCache {
            store: Arc::clone(&self.store),
            policy: self.policy,
            _value: PhantomData,
        }
    }
}

impl<V> ResourceCache<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Create a new cache over the given store.
    pub fn new(store: Arc<dyn KvStore>, policy: CachePolicy) -> Self {
        ResourceCache {
            store,
            policy,
            _value: PhantomData,
        }
    }

    /// The policy in effect.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Return the cached value.
    ///
    /// The response will be `None` for misses, including empty stored values.
    pub async fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        match self.load(key).await? {
            Some(entry) => entry.decode().map(Some),
            None => Ok(None),
        }
    }

    /// Resolve the value to surface for a freshly fetched `value`.
    ///
    /// The read and the conditional write are separate store calls, so two
    /// concurrent first fetches may both observe a miss and both write.
    pub async fn resolve(&self, key: &str, value: V) -> Result<V, CacheError> {
        self.resolve_while(key, value, || true)
            .await
            .map(Resolution::into_value)
    }

    /// Like [`resolve`](ResourceCache::resolve), but gives up before any
    /// store write once `live` returns false.
    ///
    /// A skipped resolution hands the fetched value back untouched.
    pub async fn resolve_while<F>(
        &self,
        key: &str,
        value: V,
        live: F,
    ) -> Result<Resolution<V>, CacheError>
    where
        F: Fn() -> bool,
    {
        match self.policy {
            CachePolicy::WriteOnce => match self.load(key).await? {
                Some(entry) => {
                    tracing::trace!(key, tier = self.store.name(), "cache hit");
                    entry.decode().map(Resolution::Surfaced)
                }
                None if !live() => Ok(Resolution::Skipped(value)),
                None => {
                    tracing::trace!(key, tier = self.store.name(), "cache miss");
                    self.write(key, &value).await?;
                    Ok(Resolution::Surfaced(value))
                }
            },
            CachePolicy::Refresh if !live() => Ok(Resolution::Skipped(value)),
            CachePolicy::Refresh => {
                self.write(key, &value).await?;
                Ok(Resolution::Surfaced(value))
            }
        }
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let stored = self.store.get(key).await?;
        Ok(stored.and_then(|raw| CacheEntry::from_stored(key, raw)))
    }

    async fn write(&self, key: &str, value: &V) -> Result<(), CacheError> {
        let entry = CacheEntry::encode(key, value)?;
        self.store.set(&entry.key, entry.serialized_value).await
    }
}
