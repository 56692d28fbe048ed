//! Engine store handle owned by a runtime store.

use std::sync::Arc;
use tracing::{debug, warn};
use udmf_storage::{KvManager, KvStore, StorageResult, StoreOptions};

/// An engine store handle that is returned to its manager exactly once,
/// either by [`StoreHandle::release`] or on drop.
pub(crate) struct StoreHandle {
    manager: Arc<dyn KvManager>,
    store: Option<Arc<dyn KvStore>>,
}

impl StoreHandle {
    /// Acquires a handle to `store_id` from `manager`.
    pub(crate) fn acquire(
        manager: Arc<dyn KvManager>,
        store_id: &str,
        options: &StoreOptions,
    ) -> StorageResult<Self> {
        let store = manager.get_store(store_id, options)?;
        Ok(Self {
            manager,
            store: Some(store),
        })
    }

    /// Returns the store while the handle is held.
    pub(crate) fn store(&self) -> Option<&Arc<dyn KvStore>> {
        self.store.as_ref()
    }

    /// Returns the handle to the manager. Later calls are no-ops.
    pub(crate) fn release(&mut self) -> StorageResult<()> {
        match self.store.take() {
            Some(store) => {
                debug!(store_id = store.store_id(), "releasing store handle");
                self.manager.close_store(&store)
            }
            None => Ok(()),
        }
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "store handle release failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use udmf_storage::StoreManager;

    fn memory_options() -> StoreOptions {
        StoreOptions {
            memory_db: true,
            ..StoreOptions::default()
        }
    }

    #[test]
    fn release_is_idempotent() {
        let manager = Arc::new(StoreManager::new("distributeddata", "default"));
        let mut handle =
            StoreHandle::acquire(manager.clone(), "drag", &memory_options()).unwrap();
        assert!(handle.store().is_some());
        assert_eq!(manager.open_store_count(), 1);

        handle.release().unwrap();
        handle.release().unwrap();
        assert!(handle.store().is_none());
        assert_eq!(manager.open_store_count(), 0);
    }

    #[test]
    fn drop_releases() {
        let manager = Arc::new(StoreManager::new("distributeddata", "default"));
        {
            let _handle = StoreHandle::acquire(manager.clone(), "drag", &memory_options()).unwrap();
            assert_eq!(manager.open_store_count(), 1);
        }
        assert_eq!(manager.open_store_count(), 0);
    }
}
