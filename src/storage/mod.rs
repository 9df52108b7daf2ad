//! Key-value persistence port
//!
//! All persisted state lives behind a flat, string-keyed store holding JSON text.
//! There are no transactions and no schema versioning: each key is written whole
//! and the last write wins.

mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;

use async_trait::async_trait;

/// Errors raised by a key-value backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous, process-wide key-value store.
///
/// Each call is a suspension point. Callers await completion before assuming
/// the persisted state matches their in-memory copy.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
