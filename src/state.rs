use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use crate::error::ResourceError;

/// Observable state of a resource.
#[derive(Debug, Clone)]
pub struct ResourceState<V> {
    /// Last surfaced value. Not cleared when a later fetch fails.
    pub data: Option<V>,

    /// True until the first fetch settles, and during each revalidation.
    pub is_loading: bool,

    /// Last fetch failure. Not cleared when a later fetch succeeds.
    pub error: Option<ResourceError>,
}

impl<V> Default for ResourceState<V> {
    fn default() -> Self {
        ResourceState {
            data: None,
            is_loading: true,
            error: None,
        }
    }
}

/// Holds a resource's state and broadcasts every change to subscribers.
pub struct StateContainer<V> {
    tx: watch::Sender<ResourceState<V>>,
    closed: AtomicBool,
}

impl<V> Default for StateContainer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> StateContainer<V> {
    /// Create a container in the initial loading state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ResourceState::default());
        StateContainer {
            tx,
            closed: AtomicBool::new(false),
        }
    }

    /// Apply a mutation and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut ResourceState<V>)) {
        self.tx.send_modify(f);
    }

    /// Receive every future state change.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<V>> {
        self.tx.subscribe()
    }

    /// Mark the owning resource as torn down.
    ///
    /// Wakes every waiter so [`settled`](StateContainer::settled) returns even
    /// if a discarded fetch leaves `is_loading` set.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.tx.send_modify(|_| {});
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl<V: Clone> StateContainer<V> {
    /// Current state.
    pub fn snapshot(&self) -> ResourceState<V> {
        self.tx.borrow().clone()
    }

    /// Wait until no fetch is loading, or the container is closed, and return
    /// that state.
    pub async fn settled(&self) -> ResourceState<V> {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|state| !state.is_loading || self.is_closed()).await {
            Ok(state) => (*state).clone(),
            // The sender lives in `self`, so the channel cannot close here
            Err(_) => self.snapshot(),
        }
    }
}
