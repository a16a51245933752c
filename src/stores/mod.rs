//! Key/value store implementations.

pub mod memory;
pub mod moka;

pub use memory::{SessionStore, SessionStoreConfig};
pub use moka::{MokaStore, MokaStoreConfig};
