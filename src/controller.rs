use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

use crate::cache::{Resolution, ResourceCache};
use crate::callbacks::Callbacks;
use crate::error::ResourceError;
use crate::fetcher::Fetcher;
use crate::options::{Options, SettlePolicy};
use crate::state::StateContainer;
use crate::store::KvStore;

/// What started a fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The one-shot fetch run when a resource is created.
    Init,
    /// A revalidation timer firing.
    Tick,
}

/// Runs fetch attempts for one resource key and applies their outcome.
///
/// There is a single algorithm for both triggers:
/// 1. fetch the key,
/// 2. on success resolve the surfaced value through the cache, publish it, then
///    let `on_success` replace it with the transformed raw value,
/// 3. on failure publish the error and notify `on_error`,
/// 4. leave `is_loading` false.
///
/// A tick additionally flips `is_loading` back to true before fetching.
pub struct Controller<V> {
    key: String,
    fetcher: Arc<dyn Fetcher<V>>,
    cache: ResourceCache<V>,
    callbacks: Callbacks<V>,
    settle_policy: SettlePolicy,
    state: Arc<StateContainer<V>>,
}

impl<V> Controller<V> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &Arc<StateContainer<V>> {
        &self.state
    }
}

impl<V> Controller<V>
where
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    /// Create a controller publishing into `state`.
    pub fn new(
        key: impl Into<String>,
        fetcher: Arc<dyn Fetcher<V>>,
        store: Arc<dyn KvStore>,
        options: &Options<V>,
        state: Arc<StateContainer<V>>,
    ) -> Self {
        Controller {
            key: key.into(),
            fetcher,
            cache: ResourceCache::new(store, options.cache_policy),
            callbacks: options.callbacks.clone(),
            settle_policy: options.settle_after_teardown,
            state,
        }
    }

    /// Run one fetch attempt to completion.
    ///
    /// Errors never escape: they end up in the published state.
    pub async fn run(&self, trigger: Trigger) {
        if trigger == Trigger::Tick {
            self.state.update(|state| state.is_loading = true);
        }
        tracing::debug!(key = %self.key, ?trigger, "fetch started");

        let result = self.fetcher.fetch(&self.key).await;

        if !self.suppressed() {
            match result {
                Ok(raw) => self.settle_success(raw, trigger).await,
                Err(err) => self.settle_failure(ResourceError::from(err), trigger),
            }
        }

        if self.suppressed() {
            tracing::debug!(
                key = %self.key,
                ?trigger,
                "resource torn down, discarding fetch result"
            );
            return;
        }
        self.state.update(|state| state.is_loading = false);
    }

    /// True once the resource is torn down and late results must be dropped.
    ///
    /// Checked again after every await so a teardown landing mid-settle
    /// still leaves the cache, state and callbacks untouched.
    fn suppressed(&self) -> bool {
        self.settle_policy == SettlePolicy::Suppress && self.state.is_closed()
    }

    async fn settle_success(&self, raw: V, trigger: Trigger) {
        // The transform sees the fetched value, not the cache-resolved one
        let transform_input = self.callbacks.on_success.as_ref().map(|_| raw.clone());

        let live = || !self.suppressed();
        let resolved = match self.cache.resolve_while(&self.key, raw, live).await {
            Ok(Resolution::Surfaced(resolved)) => resolved,
            Ok(Resolution::Skipped(_)) => return,
            Err(err) => return self.settle_failure(err.into(), trigger),
        };

        if self.suppressed() {
            return;
        }
        self.state.update(|state| {
            state.is_loading = false;
            state.data = Some(resolved);
        });

        if let Some(transformed) = transform_input.and_then(|raw| self.callbacks.transform(raw)) {
            self.state.update(|state| state.data = Some(transformed));
        }

        tracing::debug!(key = %self.key, ?trigger, "fetch succeeded");
    }

    fn settle_failure(&self, error: ResourceError, trigger: Trigger) {
        if self.suppressed() {
            return;
        }
        tracing::warn!(key = %self.key, ?trigger, error = %error, "fetch failed");

        self.state.update(|state| {
            state.is_loading = false;
            state.error = Some(error.clone());
        });

        self.callbacks.notify_error(&error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::stores::memory::SessionStore;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher returning queued responses in order, repeating the last one.
    struct Scripted {
        responses: Mutex<Vec<Result<Vec<u32>, String>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(responses: Vec<Result<Vec<u32>, String>>) -> Arc<Self> {
            Arc::new(Scripted {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl Fetcher<Vec<u32>> for Scripted {
        async fn fetch(&self, key: &str) -> Result<Vec<u32>, BoxError> {
            assert_eq!(key, "numbers");
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            let next = if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses[0].clone()
            };
            next.map_err(BoxError::from)
        }
    }

    /// Session store whose reads take `delay`.
    struct SlowStore {
        inner: SessionStore,
        delay: std::time::Duration,
    }

    #[async_trait::async_trait]
    impl KvStore for SlowStore {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn get(&self, key: &str) -> Result<Option<String>, crate::error::CacheError> {
            tokio::time::sleep(self.delay).await;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<(), crate::error::CacheError> {
            self.inner.set(key, value).await
        }
    }

    fn controller(
        fetcher: Arc<Scripted>,
        store: Arc<dyn KvStore>,
        options: Options<Vec<u32>>,
    ) -> Controller<Vec<u32>> {
        Controller::new(
            "numbers",
            fetcher,
            store,
            &options,
            Arc::new(StateContainer::new()),
        )
    }

    #[tokio::test]
    async fn test_success_publishes_data() {
        let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
        let ctl = controller(
            Scripted::new(vec![Ok(vec![1, 2])]),
            store.clone(),
            Options::new(),
        );

        ctl.run(Trigger::Init).await;

        let state = ctl.state().snapshot();
        assert_eq!(state.data, Some(vec![1, 2]));
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(store.get("numbers").await.unwrap().as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_second_fetch_surfaces_first_cached_value() {
        let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
        let fetcher = Scripted::new(vec![Ok(vec![1]), Ok(vec![2])]);
        let ctl = controller(fetcher.clone(), store, Options::new());

        ctl.run(Trigger::Init).await;
        ctl.run(Trigger::Tick).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(ctl.state().snapshot().data, Some(vec![1]));
    }

    #[tokio::test]
    async fn test_transform_applies_to_raw_value() {
        let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
        let fetcher = Scripted::new(vec![Ok(vec![1, 2, 3]), Ok(vec![4, 5, 6])]);
        let options = Options::new()
            .on_success(|v: Vec<u32>| v.into_iter().filter(|n| n % 2 == 0).collect());
        let ctl = controller(fetcher, store, options);

        ctl.run(Trigger::Init).await;
        assert_eq!(ctl.state().snapshot().data, Some(vec![2]));

        // Cache resolution would surface [1, 2, 3]; the transform wins
        ctl.run(Trigger::Tick).await;
        assert_eq!(ctl.state().snapshot().data, Some(vec![4, 6]));
    }

    #[tokio::test]
    async fn test_failure_publishes_error_and_notifies() {
        let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let options =
            Options::new().on_error(move |e| seen_clone.lock().unwrap().push(e.message()));
        let ctl = controller(Scripted::new(vec![Err("boom".to_string())]), store, options);

        ctl.run(Trigger::Init).await;

        let state = ctl.state().snapshot();
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert_eq!(state.error.unwrap().message(), "boom");
        assert_eq!(*seen.lock().unwrap(), vec!["boom".to_string()]);
    }

    #[tokio::test]
    async fn test_success_keeps_stale_error() {
        let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
        let fetcher = Scripted::new(vec![Err("boom".to_string()), Ok(vec![9])]);
        let ctl = controller(fetcher, store, Options::new());

        ctl.run(Trigger::Init).await;
        ctl.run(Trigger::Tick).await;

        let state = ctl.state().snapshot();
        assert_eq!(state.data, Some(vec![9]));
        assert_eq!(state.error.unwrap().message(), "boom");
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_surfaces_as_error() {
        let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
        store.set("numbers", "not json".to_string()).await.unwrap();
        let transformed = Arc::new(AtomicUsize::new(0));
        let transformed_clone = transformed.clone();
        let options = Options::new().on_success(move |v| {
            transformed_clone.fetch_add(1, Ordering::SeqCst);
            v
        });
        let ctl = controller(Scripted::new(vec![Ok(vec![1])]), store, options);

        ctl.run(Trigger::Init).await;

        let state = ctl.state().snapshot();
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert!(matches!(state.error, Some(ResourceError::Cache(_))));
        assert_eq!(transformed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_suppressed_after_close() {
        let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
        let ctl = controller(
            Scripted::new(vec![Ok(vec![1])]),
            store.clone(),
            Options::new(),
        );

        ctl.state().close();
        ctl.run(Trigger::Init).await;

        let state = ctl.state().snapshot();
        assert!(state.data.is_none());
        assert!(state.is_loading);
        assert!(store.get("numbers").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_applied_after_close() {
        let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
        let options = Options::new().settle_after_teardown(SettlePolicy::Apply);
        let ctl = controller(Scripted::new(vec![Ok(vec![1])]), store, options);

        ctl.state().close();
        ctl.run(Trigger::Init).await;

        let state = ctl.state().snapshot();
        assert_eq!(state.data, Some(vec![1]));
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_during_cache_read_discards_result() {
        let store = Arc::new(SlowStore {
            inner: SessionStore::default(),
            delay: std::time::Duration::from_secs(1),
        });
        let callbacks = Arc::new(AtomicUsize::new(0));
        let on_success = callbacks.clone();
        let on_error = callbacks.clone();
        let options = Options::new()
            .on_success(move |v| {
                on_success.fetch_add(1, Ordering::SeqCst);
                v
            })
            .on_error(move |_| {
                on_error.fetch_add(1, Ordering::SeqCst);
            });
        let ctl = Arc::new(controller(
            Scripted::new(vec![Ok(vec![1])]),
            store.clone(),
            options,
        ));

        let run = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.run(Trigger::Init).await }
        });

        // The fetch is done; the cache read is still pending
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        ctl.state().close();
        run.await.unwrap();

        let state = ctl.state().snapshot();
        assert!(state.data.is_none());
        assert!(state.error.is_none());
        assert!(state.is_loading);
        assert_eq!(callbacks.load(Ordering::SeqCst), 0);
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_during_cache_read_applied_with_apply_policy() {
        let store = Arc::new(SlowStore {
            inner: SessionStore::default(),
            delay: std::time::Duration::from_secs(1),
        });
        let options = Options::new().settle_after_teardown(SettlePolicy::Apply);
        let ctl = Arc::new(controller(
            Scripted::new(vec![Ok(vec![1])]),
            store.clone(),
            options,
        ));

        let run = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.run(Trigger::Init).await }
        });

        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        ctl.state().close();
        run.await.unwrap();

        let state = ctl.state().snapshot();
        assert_eq!(state.data, Some(vec![1]));
        assert!(!state.is_loading);
        assert!(!store.inner.is_empty().await);
    }
}
