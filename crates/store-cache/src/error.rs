//! Cache error types.

use thiserror::Error;

/// Errors that can occur when using the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("Failed to open store {path}: {message}")]
    OpenError { path: String, message: String },

    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to perform a store operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// Failed to write the store to disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key not found.
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Concurrent modification detected.
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),
}
