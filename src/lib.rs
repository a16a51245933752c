//! swr-resource - bind an async resource fetch to a consumer's lifecycle
//!
//! A [`Resource`] fetches one key once, exposes `data`/`is_loading`/`error`
//! state, caches the result in an injected session store and optionally
//! re-fetches on a fixed interval:
//! - Write-once session caching (or a refreshing policy)
//! - Interval revalidation that re-arms when the interval changes
//! - Success transform and error observer callbacks
//! - Teardown that stops the timer and detaches in-flight fetches
//!
//! # Example
//!
//! ```ignore
//! use swr_resource::{KvStore, Options, Resource, SessionStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store: Arc<dyn KvStore> = Arc::new(SessionStore::default());
//!
//!     let users = Resource::new(
//!         "https://jsonplaceholder.typicode.com/users",
//!         |url: String| async move {
//!             reqwest::get(url).await?.json::<Vec<User>>().await
//!         },
//!         store,
//!         Options::new().revalidate(5.0),
//!     );
//!
//!     let state = users.settled().await;
//!     for user in state.data.unwrap_or_default() {
//!         println!("{}", user.name);
//!     }
//! }
//! ```

mod cache;
mod callbacks;
mod controller;
mod entry;
mod error;
mod fetcher;
mod options;
mod resource;
pub mod scheduler;
mod state;
mod store;
pub mod stores;

// Re-export public API
pub use cache::{CachePolicy, Resolution, ResourceCache};
pub use callbacks::{Callbacks, OnError, OnSuccess};
pub use controller::{Controller, Trigger};
pub use entry::CacheEntry;
pub use error::{BoxError, CacheError, ResourceError};
pub use fetcher::Fetcher;
pub use options::{Options, SettlePolicy, revalidate_interval};
pub use resource::Resource;
pub use scheduler::{Disposer, RevalidationScheduler};
pub use state::{ResourceState, StateContainer};
pub use store::KvStore;
pub use stores::memory::{SessionStore, SessionStoreConfig};
pub use stores::moka::{MokaStore, MokaStoreConfig};
