use std::error::Error as StdError;
use std::sync::Arc;

/// Boxed error returned by fetchers.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Error type for cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// A store operation failed.
    #[error("[{tier}] cache error for key '{key}': {message}")]
    Operation {
        tier: String,
        key: String,
        message: String,
    },
    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Create a new operation error.
    pub fn operation(
        tier: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CacheError::Operation {
            tier: tier.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Error surfaced through a resource's observable state.
///
/// Cloneable so that it can be held in [`ResourceState`](crate::ResourceState)
/// and handed to every subscriber.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResourceError {
    /// The fetcher failed.
    #[error("{0}")]
    Fetch(Arc<dyn StdError + Send + Sync>),
    /// Reading or writing the cached entry failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ResourceError {
    /// Wrap a fetcher error.
    pub fn fetch(err: impl Into<BoxError>) -> Self {
        ResourceError::Fetch(Arc::from(err.into()))
    }

    /// Display text of the underlying cause.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether this error came from the fetcher rather than the cache.
    pub fn is_fetch(&self) -> bool {
        matches!(self, ResourceError::Fetch(_))
    }
}

impl From<BoxError> for ResourceError {
    fn from(err: BoxError) -> Self {
        ResourceError::Fetch(Arc::from(err))
    }
}
