//! Error types for key-value engine operations.

use std::io;
use thiserror::Error;

/// Result type for engine operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors reported by a key-value engine.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The on-disk log of a store is corrupted.
    #[error("store corrupted: {0}")]
    Corrupted(String),

    /// The store handle has been released.
    #[error("store is closed")]
    Closed,

    /// No store with the given id exists (or is open on this manager).
    #[error("store not found: {store_id}")]
    StoreNotFound {
        /// The requested store id.
        store_id: String,
    },

    /// The caller passed arguments the engine cannot accept.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// The requested feature is not available in this engine.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Another process holds the store directory.
    #[error("store busy: {store_id} is locked by another process")]
    Busy {
        /// The locked store id.
        store_id: String,
    },

    /// A fault injected by a test engine.
    #[error("injected fault: {0}")]
    Injected(String),
}

impl StorageError {
    /// Creates an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }

    /// Creates a store-not-found error.
    pub fn store_not_found(store_id: impl Into<String>) -> Self {
        Self::StoreNotFound {
            store_id: store_id.into(),
        }
    }
}
