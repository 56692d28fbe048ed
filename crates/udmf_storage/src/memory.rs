//! In-memory key-value store.

use crate::engine::{Entry, KvStore, StoreOptions, SyncCallback, SyncMode};
use crate::error::StorageResult;
use crate::sync::{validate_request, DeviceNetwork, PushJob};
use crate::table::Table;
use std::sync::Arc;

/// A key-value store that lives only in memory.
///
/// Suitable for:
/// - Unit and integration tests
/// - Stores opened with [`StoreOptions::memory_db`]
///
/// # Example
///
/// ```rust
/// use udmf_storage::{Entry, InMemoryStore, KvStore};
///
/// let store = InMemoryStore::new("drag");
/// store.put_batch(&[Entry::new("udmf://a/b/c", b"runtime".to_vec())]).unwrap();
/// let found = store.get_entries(b"udmf://a/").unwrap();
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Debug)]
pub struct InMemoryStore {
    store_id: String,
    options: StoreOptions,
    table: Table,
    network: Option<Arc<DeviceNetwork>>,
}

impl InMemoryStore {
    /// Creates an empty store with default options and no peers.
    #[must_use]
    pub fn new(store_id: impl Into<String>) -> Self {
        Self::with_options(store_id, StoreOptions::default(), None)
    }

    /// Creates an empty store with explicit options and an optional network.
    #[must_use]
    pub fn with_options(
        store_id: impl Into<String>,
        options: StoreOptions,
        network: Option<Arc<DeviceNetwork>>,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            options,
            table: Table::new(),
            network,
        }
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for InMemoryStore {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    fn options(&self) -> &StoreOptions {
        &self.options
    }

    fn put_batch(&self, entries: &[Entry]) -> StorageResult<()> {
        self.table.ensure_open()?;
        self.table.apply_put(entries);
        Ok(())
    }

    fn delete_batch(&self, keys: &[Vec<u8>]) -> StorageResult<()> {
        self.table.ensure_open()?;
        self.table.apply_delete(keys);
        Ok(())
    }

    fn get_entries(&self, prefix: &[u8]) -> StorageResult<Vec<Entry>> {
        self.table.ensure_open()?;
        Ok(self.table.scan(prefix))
    }

    fn sync(
        &self,
        devices: &[String],
        mode: SyncMode,
        on_complete: SyncCallback,
    ) -> StorageResult<()> {
        self.table.ensure_open()?;
        validate_request(devices, mode)?;
        PushJob {
            network: self.network.clone(),
            store_id: self.store_id.clone(),
            options: self.options.clone(),
            snapshot: self.table.scan(b""),
            devices: devices.to_vec(),
        }
        .spawn(on_complete)
    }

    fn close(&self) -> StorageResult<()> {
        self.table.mark_closed();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SyncStatus;
    use crate::error::StorageError;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn memory_new_is_empty() {
        let store = InMemoryStore::new("drag");
        assert!(store.is_empty());
        assert_eq!(store.store_id(), "drag");
    }

    #[test]
    fn memory_put_then_scan() {
        let store = InMemoryStore::new("drag");
        store
            .put_batch(&[
                Entry::new("udmf://a/b/c", "rt"),
                Entry::new("udmf://a/b/c/1", "r1"),
                Entry::new("udmf://x/y/z", "other"),
            ])
            .unwrap();

        let found = store.get_entries(b"udmf://a/b/c").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, b"rt");
        assert_eq!(found[1].value, b"r1");
    }

    #[test]
    fn memory_put_overwrites() {
        let store = InMemoryStore::new("drag");
        store.put_batch(&[Entry::new("k", "v1")]).unwrap();
        store.put_batch(&[Entry::new("k", "v2")]).unwrap();
        let found = store.get_entries(b"k").unwrap();
        assert_eq!(found, vec![Entry::new("k", "v2")]);
    }

    #[test]
    fn memory_delete_batch() {
        let store = InMemoryStore::new("drag");
        store
            .put_batch(&[Entry::new("a", "1"), Entry::new("b", "2")])
            .unwrap();
        store.delete_batch(&[b"a".to_vec()]).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_closed_rejects_everything() {
        let store = InMemoryStore::new("drag");
        store.close().unwrap();
        assert!(matches!(
            store.put_batch(&[Entry::new("a", "1")]),
            Err(StorageError::Closed)
        ));
        assert!(matches!(store.get_entries(b""), Err(StorageError::Closed)));
    }

    #[test]
    fn memory_sync_without_network_reports_offline() {
        let store = InMemoryStore::new("drag");
        store.put_batch(&[Entry::new("a", "1")]).unwrap();

        let (tx, rx) = mpsc::channel();
        store
            .sync(
                &["peer".to_string()],
                SyncMode::PushOnly,
                Box::new(move |outcome| {
                    let _ = tx.send(outcome.clone());
                }),
            )
            .unwrap();

        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.get("peer"), Some(&SyncStatus::Offline));
    }
}
