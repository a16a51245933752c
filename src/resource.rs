use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tokio::sync::watch;

use crate::controller::{Controller, Trigger};
use crate::error::ResourceError;
use crate::fetcher::Fetcher;
use crate::options::Options;
use crate::scheduler::RevalidationScheduler;
use crate::state::{ResourceState, StateContainer};
use crate::store::KvStore;

/// A fetched resource bound to the lifetime of its owner.
///
/// Creating a `Resource` starts the initial fetch right away and arms the
/// revalidation timer if `revalidate_seconds` is enabled. Dropping it (or
/// calling [`teardown`](Resource::teardown)) stops the timer.
///
/// # Example
/// ```ignore
/// let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
/// let users = Resource::new(
///     "https://example.com/users",
///     |url: String| async move { fetch_users(&url).await },
///     store,
///     Options::new().revalidate(5.0),
/// );
///
/// let state = users.settled().await;
/// if let Some(err) = state.error {
///     eprintln!("{}", err);
/// }
/// ```
pub struct Resource<V> {
    controller: Arc<Controller<V>>,
    state: Arc<StateContainer<V>>,
    scheduler: RevalidationScheduler,
    torn_down: bool,
}

impl<V> Resource<V>
where
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    /// Create the resource and start fetching `key`.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn new<F>(
        key: impl Into<String>,
        fetcher: F,
        store: Arc<dyn KvStore>,
        options: Options<V>,
    ) -> Self
    where
        F: Fetcher<V> + 'static,
    {
        Self::with_fetcher(key, Arc::new(fetcher), store, options)
    }

    /// Like [`new`](Resource::new), for a fetcher that is already shared.
    pub fn with_fetcher(
        key: impl Into<String>,
        fetcher: Arc<dyn Fetcher<V>>,
        store: Arc<dyn KvStore>,
        options: Options<V>,
    ) -> Self {
        let state = Arc::new(StateContainer::new());
        let controller = Arc::new(Controller::new(
            key,
            fetcher,
            store,
            &options,
            state.clone(),
        ));

        let init = controller.clone();
        tokio::spawn(async move {
            init.run(Trigger::Init).await;
        });

        let mut resource = Resource {
            controller,
            state,
            scheduler: RevalidationScheduler::new(),
            torn_down: false,
        };
        resource.arm(options.revalidate_seconds);
        resource
    }

    /// Change the revalidation interval.
    ///
    /// A different value cancels the running timer and arms a new one; the
    /// same value leaves the running timer alone. Ignored after teardown.
    pub fn set_revalidate(&mut self, seconds: Option<f64>) {
        if self.torn_down {
            tracing::debug!(
                key = %self.controller.key(),
                "ignoring revalidate change after teardown"
            );
            return;
        }
        self.arm(seconds);
    }

    fn arm(&mut self, seconds: Option<f64>) {
        let controller = self.controller.clone();
        self.scheduler.rearm(seconds, move || {
            let controller = controller.clone();
            tokio::spawn(async move {
                controller.run(Trigger::Tick).await;
            });
        });
    }

    /// Current state.
    pub fn state(&self) -> ResourceState<V> {
        self.state.snapshot()
    }

    pub fn data(&self) -> Option<V> {
        self.state.snapshot().data
    }

    pub fn is_loading(&self) -> bool {
        self.state.snapshot().is_loading
    }

    pub fn error(&self) -> Option<ResourceError> {
        self.state.snapshot().error
    }

    /// Wait until no fetch is in progress and return that state.
    ///
    /// After teardown this returns the current state immediately.
    pub async fn settled(&self) -> ResourceState<V> {
        self.state.settled().await
    }

    /// Receive every future state change.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<V>> {
        self.state.subscribe()
    }
}

impl<V> Resource<V> {
    pub fn key(&self) -> &str {
        self.controller.key()
    }

    /// The revalidate setting currently in effect.
    pub fn revalidate_seconds(&self) -> Option<f64> {
        self.scheduler.seconds()
    }

    pub fn is_revalidating(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Stop revalidation and detach from in-flight fetches.
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.state.close();
        self.scheduler.cancel();
    }
}

impl<V> Drop for Resource<V> {
    fn drop(&mut self) {
        self.teardown();
    }
}
