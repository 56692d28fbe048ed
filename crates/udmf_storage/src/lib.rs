//! # udmf Storage
//!
//! Ordered key-value engine used by the udmf stores.
//!
//! Stores are **opaque byte maps** - they do not interpret keys or values.
//! The engine offers exactly what the unified-data layer consumes:
//!
//! - atomic batch put and batch delete
//! - prefix range scans in key order
//! - push-only synchronization to named peer devices
//! - a manager that hands out shared handles to named stores
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and memory-only stores
//! - [`FileStore`] - Persistent store backed by a checksummed batch log
//!
//! ## Example
//!
//! ```rust
//! use udmf_storage::{Entry, InMemoryStore, KvStore};
//!
//! let store = InMemoryStore::new("drag");
//! store.put_batch(&[Entry::new("k1", "v1"), Entry::new("k2", "v2")]).unwrap();
//! assert_eq!(store.get_entries(b"k").unwrap().len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod file;
mod log;
mod manager;
mod memory;
mod sync;
mod table;

pub use engine::{
    Entry, KvManager, KvManagerConfig, KvStore, SecurityFlag, SecurityLevel, SecurityOption,
    StoreOptions, SyncCallback, SyncMode, SyncStatus,
};
pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use manager::StoreManager;
pub use memory::InMemoryStore;
pub use sync::DeviceNetwork;
