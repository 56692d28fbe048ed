//! Ordered in-memory table shared by the engines.

use crate::engine::Entry;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Ordered key-value map with a closed flag.
#[derive(Debug, Default)]
pub(crate) struct Table {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    closed: AtomicBool,
}

impl Table {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub(crate) fn apply_put(&self, entries: &[Entry]) {
        let mut map = self.entries.write();
        for entry in entries {
            map.insert(entry.key.clone(), entry.value.clone());
        }
    }

    pub(crate) fn apply_delete(&self, keys: &[Vec<u8>]) {
        let mut map = self.entries.write();
        for key in keys {
            map.remove(key);
        }
    }

    pub(crate) fn scan(&self, prefix: &[u8]) -> Vec<Entry> {
        let map = self.entries.read();
        map.range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| Entry::new(key.clone(), value.clone()))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_stops_at_prefix_boundary() {
        let table = Table::new();
        table.apply_put(&[
            Entry::new("a/1", "x"),
            Entry::new("a/2", "y"),
            Entry::new("b/1", "z"),
        ]);

        let found = table.scan(b"a/");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].key, b"a/1");
        assert_eq!(found[1].key, b"a/2");
    }

    #[test]
    fn empty_prefix_scans_everything() {
        let table = Table::new();
        table.apply_put(&[Entry::new("a", "1"), Entry::new("b", "2")]);
        assert_eq!(table.scan(b"").len(), 2);
    }

    #[test]
    fn delete_ignores_missing_keys() {
        let table = Table::new();
        table.apply_put(&[Entry::new("a", "1")]);
        table.apply_delete(&[b"a".to_vec(), b"missing".to_vec()]);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn closed_table_rejects() {
        let table = Table::new();
        assert!(table.ensure_open().is_ok());
        table.mark_closed();
        assert!(matches!(table.ensure_open(), Err(StorageError::Closed)));
    }
}
