use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::CachePolicy;
use crate::callbacks::Callbacks;
use crate::error::ResourceError;

/// What happens when a fetch settles after its resource was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlePolicy {
    /// Discard the settlement: no cache write, no callbacks, no state change.
    #[default]
    Suppress,
    /// Apply the settlement as if the resource were still alive.
    Apply,
}

/// Configuration for a [`Resource`](crate::Resource).
///
/// Every field is independently optional:
/// - `revalidate_seconds`: `None` (no periodic revalidation)
/// - `callbacks`: no transform, no observer
/// - `cache_policy`: [`CachePolicy::WriteOnce`]
/// - `settle_after_teardown`: [`SettlePolicy::Suppress`]
///
/// # Example
/// ```ignore
/// let options = Options::<Vec<User>>::new()
///     .revalidate(5.0)
///     .on_success(|users| users.into_iter().filter(|u| u.active).collect())
///     .on_error(|e| eprintln!("fetch failed: {}", e));
/// ```
pub struct Options<V> {
    /// Seconds between revalidations. Negative or NaN disables them, `0` fires
    /// as often as the timer allows.
    pub revalidate_seconds: Option<f64>,
    pub callbacks: Callbacks<V>,
    pub cache_policy: CachePolicy,
    pub settle_after_teardown: SettlePolicy,
}

impl<V> Default for Options<V> {
    fn default() -> Self {
        Options {
            revalidate_seconds: None,
            callbacks: Callbacks::default(),
            cache_policy: CachePolicy::default(),
            settle_after_teardown: SettlePolicy::default(),
        }
    }
}

impl<V> Clone for Options<V> {
    fn clone(&self) -> Self {
        Options {
            revalidate_seconds: self.revalidate_seconds,
            callbacks: self.callbacks.clone(),
            cache_policy: self.cache_policy,
            settle_after_teardown: self.settle_after_teardown,
        }
    }
}

impl<V> fmt::Debug for Options<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("revalidate_seconds", &self.revalidate_seconds)
            .field("callbacks", &self.callbacks)
            .field("cache_policy", &self.cache_policy)
            .field("settle_after_teardown", &self.settle_after_teardown)
            .finish()
    }
}

impl<V> Options<V> {
    /// Options with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Revalidate every `seconds` seconds.
    pub fn revalidate(mut self, seconds: f64) -> Self {
        self.revalidate_seconds = Some(seconds);
        self
    }

    /// Transform each raw fetched value into the surfaced `data`.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(V) -> V + Send + Sync + 'static,
    {
        self.callbacks.on_success = Some(Arc::new(f));
        self
    }

    /// Observe each fetch failure.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResourceError) + Send + Sync + 'static,
    {
        self.callbacks.on_error = Some(Arc::new(f));
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn settle_after_teardown(mut self, policy: SettlePolicy) -> Self {
        self.settle_after_teardown = policy;
        self
    }

    /// The revalidation interval, if revalidation is enabled.
    pub fn revalidate_interval(&self) -> Option<Duration> {
        revalidate_interval(self.revalidate_seconds)
    }
}

/// Convert a revalidate option into a timer period.
///
/// `None`, negative and NaN values disable revalidation. Values too large to
/// represent as a `Duration` disable it as well, since such a timer would
/// never fire.
pub fn revalidate_interval(seconds: Option<f64>) -> Option<Duration> {
    let seconds = seconds?;
    if seconds.is_nan() || seconds < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(seconds).ok()
}
