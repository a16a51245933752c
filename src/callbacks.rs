use std::fmt;
use std::sync::Arc;

use crate::error::ResourceError;

/// Transform applied to each successfully fetched value.
pub type OnSuccess<V> = Arc<dyn Fn(V) -> V + Send + Sync>;

/// Observer invoked with each fetch failure.
pub type OnError = Arc<dyn Fn(&ResourceError) + Send + Sync>;

/// Caller-supplied hooks run after each fetch settles.
///
/// Both hooks are optional; a missing hook is a no-op.
pub struct Callbacks<V> {
    pub on_success: Option<OnSuccess<V>>,
    pub on_error: Option<OnError>,
}

impl<V> Default for Callbacks<V> {
    fn default() -> Self {
        Callbacks {
            on_success: None,
            on_error: None,
        }
    }
}

impl<V> Clone for Callbacks<V> {
    fn clone(&self) -> Self {
        Callbacks {
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<V> fmt::Debug for Callbacks<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl<V> Callbacks<V> {
    /// Apply the success transform to the raw fetched value.
    ///
    /// Returns `None` when no transform is configured, leaving the
    /// cache-resolved value in place.
    pub fn transform(&self, raw: V) -> Option<V> {
        self.on_success.as_ref().map(|f| f(raw))
    }

    /// Notify the error observer.
    pub fn notify_error(&self, error: &ResourceError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }
}
