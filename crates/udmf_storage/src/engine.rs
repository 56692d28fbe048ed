//! Key-value engine trait definitions.

use crate::error::StorageResult;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A single physical key-value pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entry {
    /// Raw key bytes.
    pub key: Vec<u8>,
    /// Raw value bytes.
    pub value: Vec<u8>,
}

impl Entry {
    /// Creates an entry from anything convertible into key and value bytes.
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the key as UTF-8 text, replacing invalid sequences.
    #[must_use]
    pub fn key_lossy(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }
}

/// Direction of a synchronization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Send local entries to the peers without pulling theirs.
    PushOnly,
    /// Pull peer entries without sending local ones.
    PullOnly,
    /// Both directions.
    PushPull,
}

/// Per-device outcome of a synchronization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// The device received every entry.
    Ok,
    /// The device is not reachable.
    Offline,
    /// The device was reached but rejected the data.
    Failed(String),
}

/// Completion handler invoked once per sync request with every device's outcome.
///
/// Handlers may run on a background thread after the requesting store handle
/// has been released, so they must own everything they capture.
pub type SyncCallback = Box<dyn FnOnce(&BTreeMap<String, SyncStatus>) + Send + 'static>;

/// Security level label attached to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SecurityLevel {
    /// No label.
    NotSet,
    /// Public data.
    S0,
    /// Low sensitivity.
    S1,
    /// Medium sensitivity.
    S2,
    /// High sensitivity.
    S3,
    /// Critical.
    S4,
}

/// Protection class applied to a labelled store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityFlag {
    /// Readable only after first unlock.
    Ece,
    /// Readable only while unlocked.
    Sece,
}

/// Security option of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityOption {
    /// Sensitivity label.
    pub level: SecurityLevel,
    /// Protection class.
    pub flag: SecurityFlag,
}

impl Default for SecurityOption {
    fn default() -> Self {
        Self {
            level: SecurityLevel::NotSet,
            flag: SecurityFlag::Ece,
        }
    }
}

/// Options used to open one named store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Create the store if it does not exist.
    pub create_if_missing: bool,
    /// Keep the store in memory only.
    pub memory_db: bool,
    /// Lay the store out as `<base_dir>/<store_id>` instead of
    /// `<base_dir>/<app_id>/<user_id>/<store_id>`.
    pub create_dir_by_store_id_only: bool,
    /// Encrypt the store at rest.
    pub encrypted: bool,
    /// Drop a corrupted log tail instead of failing the open.
    pub remove_corrupted: bool,
    /// Sync with (user, app) tuples instead of app identity only.
    pub sync_dual_tuple_mode: bool,
    /// Security label of the store.
    pub security: SecurityOption,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            memory_db: false,
            create_dir_by_store_id_only: false,
            encrypted: false,
            remove_corrupted: false,
            sync_dual_tuple_mode: false,
            security: SecurityOption::default(),
        }
    }
}

/// An ordered key-value store.
///
/// Stores are shared between callers, so every operation takes `&self`
/// and implementations use interior locking.
///
/// # Invariants
///
/// - `put_batch` and `delete_batch` are atomic: either every entry is
///   applied or none is
/// - `get_entries` returns entries in ascending key order
/// - after `close`, every operation fails with [`crate::StorageError::Closed`]
pub trait KvStore: Send + Sync {
    /// Returns the id this store was opened under.
    fn store_id(&self) -> &str;

    /// Returns the options this store was opened with.
    fn options(&self) -> &StoreOptions;

    /// Writes all entries atomically, replacing existing values.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the write cannot be made durable.
    fn put_batch(&self, entries: &[Entry]) -> StorageResult<()>;

    /// Removes all keys atomically. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the delete cannot be made durable.
    fn delete_batch(&self, keys: &[Vec<u8>]) -> StorageResult<()>;

    /// Returns every entry whose key starts with `prefix`, in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed.
    fn get_entries(&self, prefix: &[u8]) -> StorageResult<Vec<Entry>>;

    /// Requests synchronization with the named devices.
    ///
    /// The returned status only says whether the request was accepted;
    /// per-device results are delivered to `on_complete`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected (closed store, empty
    /// device list, unsupported mode).
    fn sync(&self, devices: &[String], mode: SyncMode, on_complete: SyncCallback)
        -> StorageResult<()>;

    /// Flushes and closes the store. Called by the owning manager when the
    /// last handle is released.
    ///
    /// # Errors
    ///
    /// Returns an error if pending data cannot be flushed.
    fn close(&self) -> StorageResult<()>;
}

/// Manager-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvManagerConfig {
    /// Physical root directory shared by every store of this manager.
    pub base_dir: PathBuf,
}

impl KvManagerConfig {
    /// Creates a configuration rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

/// Hands out shared handles to named stores.
pub trait KvManager: Send + Sync {
    /// Sets the manager-wide configuration used by later opens.
    fn set_config(&self, config: KvManagerConfig);

    /// Opens (or re-uses) the store named `store_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store does not exist and may not be created,
    /// the options are unsupported, or the store cannot be opened. Re-using
    /// an open store with a different `memory_db`, directory layout or
    /// security setting is `InvalidArgs`.
    fn get_store(&self, store_id: &str, options: &StoreOptions) -> StorageResult<Arc<dyn KvStore>>;

    /// Releases a handle obtained from [`KvManager::get_store`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::StoreNotFound`] if the handle was not
    /// handed out by this manager or was already released.
    fn close_store(&self, store: &Arc<dyn KvStore>) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_key_lossy() {
        let entry = Entry::new("udmf://a/b/c", vec![1, 2]);
        assert_eq!(entry.key_lossy(), "udmf://a/b/c");
    }

    #[test]
    fn entries_order_by_key() {
        let mut entries = vec![Entry::new("b", "1"), Entry::new("a", "2")];
        entries.sort();
        assert_eq!(entries[0].key, b"a");
    }

    #[test]
    fn default_options() {
        let options = StoreOptions::default();
        assert!(options.create_if_missing);
        assert!(!options.memory_db);
        assert_eq!(options.security.level, SecurityLevel::NotSet);
    }
}
