//! Durable key-value persistence for session and preference state.
//!
//! Each value lives under its own key so it can be read and written
//! independently:
//! - `token`: opaque session token
//! - `user`: JSON user profile
//! - `theme`: `dark` or `light`
//!
//! Backends: `FileStore` (default), `KeyringStore` (OS keychain) and
//! `MemoryStore` (nothing persisted).

pub mod file;
pub mod keychain;
pub mod memory;
pub mod theme;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{Config, StorageBackend};

pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;
pub use theme::{Theme, ThemeStore};

/// A string key-value store that survives process restarts (except `MemoryStore`).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a key that does not exist is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Open the store selected by the config
pub fn open(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.storage {
        StorageBackend::File => Arc::new(FileStore::new(config.data_dir()?.join("state"))?),
        StorageBackend::Keyring => Arc::new(KeyringStore::new()),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}
