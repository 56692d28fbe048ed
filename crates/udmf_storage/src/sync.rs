//! Device-to-device push synchronization.
//!
//! A [`DeviceNetwork`] maps device ids to the managers that own their
//! stores. A push copies a snapshot of the requesting store into the store
//! with the same id on every named device. Pushes run on a background thread
//! and report per-device outcomes through the request's [`SyncCallback`].

use crate::engine::{Entry, KvManager, StoreOptions, SyncCallback, SyncMode, SyncStatus};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use std::thread;
use tracing::{debug, warn};

/// Registry of reachable devices.
///
/// Managers are held weakly, so a device whose manager has been dropped
/// reports [`SyncStatus::Offline`].
#[derive(Default)]
pub struct DeviceNetwork {
    devices: RwLock<HashMap<String, Weak<dyn KvManager>>>,
}

impl DeviceNetwork {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `manager` reachable as `device_id`, replacing any previous one.
    pub fn register(&self, device_id: impl Into<String>, manager: &Arc<dyn KvManager>) {
        self.devices
            .write()
            .insert(device_id.into(), Arc::downgrade(manager));
    }

    /// Takes a device offline.
    pub fn unregister(&self, device_id: &str) {
        self.devices.write().remove(device_id);
    }

    /// Returns true if the device is registered and its manager is alive.
    #[must_use]
    pub fn is_online(&self, device_id: &str) -> bool {
        self.resolve(device_id).is_some()
    }

    pub(crate) fn resolve(&self, device_id: &str) -> Option<Arc<dyn KvManager>> {
        self.devices.read().get(device_id).and_then(Weak::upgrade)
    }
}

impl std::fmt::Debug for DeviceNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let devices: Vec<String> = self.devices.read().keys().cloned().collect();
        f.debug_struct("DeviceNetwork")
            .field("devices", &devices)
            .finish()
    }
}

/// Checks that a sync request can be accepted.
pub(crate) fn validate_request(devices: &[String], mode: SyncMode) -> StorageResult<()> {
    if devices.is_empty() {
        return Err(StorageError::invalid_args("sync requires at least one device"));
    }
    if mode != SyncMode::PushOnly {
        return Err(StorageError::NotSupported(format!(
            "sync mode {mode:?} is not supported, only push-only"
        )));
    }
    Ok(())
}

/// A push request captured by value so it can outlive the requesting store.
pub(crate) struct PushJob {
    pub(crate) network: Option<Arc<DeviceNetwork>>,
    pub(crate) store_id: String,
    pub(crate) options: StoreOptions,
    pub(crate) snapshot: Vec<Entry>,
    pub(crate) devices: Vec<String>,
}

impl PushJob {
    /// Runs the push on a background thread.
    pub(crate) fn spawn(self, on_complete: SyncCallback) -> StorageResult<()> {
        thread::Builder::new()
            .name(format!("udmf-sync-{}", self.store_id))
            .spawn(move || {
                let outcome = self.run();
                on_complete(&outcome);
            })?;
        Ok(())
    }

    fn run(&self) -> BTreeMap<String, SyncStatus> {
        let mut outcome = BTreeMap::new();
        for device in &self.devices {
            let status = match self.network.as_ref().and_then(|n| n.resolve(device)) {
                Some(manager) => self.push_to(manager.as_ref()),
                None => SyncStatus::Offline,
            };
            debug!(store_id = %self.store_id, device = %device, ?status, "push finished");
            outcome.insert(device.clone(), status);
        }
        outcome
    }

    fn push_to(&self, manager: &dyn KvManager) -> SyncStatus {
        let store = match manager.get_store(&self.store_id, &self.options) {
            Ok(store) => store,
            Err(e) => return SyncStatus::Failed(e.to_string()),
        };
        let written = store.put_batch(&self.snapshot);
        let released = manager.close_store(&store);
        if let Err(e) = &released {
            warn!(store_id = %self.store_id, error = %e, "releasing peer store failed");
        }
        match written.and(released) {
            Ok(()) => SyncStatus::Ok,
            Err(e) => SyncStatus::Failed(e.to_string()),
        }
    }
}
