use async_trait::async_trait;
use std::future::Future;

use crate::error::BoxError;

/// Loads the value for a resource key.
///
/// Implemented for every `Fn(String) -> impl Future<Output = Result<V, E>>`
/// where `E` converts into a boxed error, so plain async closures can be used
/// directly.
///
/// # Example
/// ```ignore
/// let fetcher = |url: String| async move {
///     reqwest::get(url).await?.json::<Vec<User>>().await
/// };
/// ```
#[async_trait]
pub trait Fetcher<V>: Send + Sync {
    /// Load the value for `key`.
    async fn fetch(&self, key: &str) -> Result<V, BoxError>;
}

#[async_trait]
impl<V, F, Fut, E> Fetcher<V> for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
    V: Send + 'static,
{
    async fn fetch(&self, key: &str) -> Result<V, BoxError> {
        (self)(key.to_string()).await.map_err(Into::into)
    }
}
