//! Store manager: one manager per (app, user) identity.

use crate::engine::{KvManager, KvManagerConfig, KvStore, StoreOptions};
use crate::error::{StorageError, StorageResult};
use crate::file::FileStore;
use crate::memory::InMemoryStore;
use crate::sync::DeviceNetwork;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An open store and the number of handles given out for it.
struct OpenStore {
    store: Arc<dyn KvStore>,
    handles: usize,
}

/// Hands out reference-counted handles to named stores.
///
/// Opening the same store id twice returns the same underlying store as long
/// as the layout options agree; the store is closed when the last handle is released through
/// [`KvManager::close_store`].
///
/// # Example
///
/// ```rust
/// use udmf_storage::{KvManager, KvManagerConfig, StoreManager, StoreOptions};
///
/// let dir = tempfile::tempdir().unwrap();
/// let manager = StoreManager::new("distributeddata", "default");
/// manager.set_config(KvManagerConfig::new(dir.path()));
///
/// let options = StoreOptions { create_dir_by_store_id_only: true, ..StoreOptions::default() };
/// let store = manager.get_store("drag", &options).unwrap();
/// manager.close_store(&store).unwrap();
/// ```
pub struct StoreManager {
    app_id: String,
    user_id: String,
    config: RwLock<Option<KvManagerConfig>>,
    network: Option<Arc<DeviceNetwork>>,
    open: Mutex<HashMap<String, OpenStore>>,
}

impl StoreManager {
    /// Creates a manager for the given app and user identity.
    pub fn new(app_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            user_id: user_id.into(),
            config: RwLock::new(None),
            network: None,
            open: Mutex::new(HashMap::new()),
        }
    }

    /// Attaches the manager's stores to a device network for sync.
    #[must_use]
    pub fn with_network(mut self, network: Arc<DeviceNetwork>) -> Self {
        self.network = Some(network);
        self
    }

    /// Returns the app id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the number of distinct stores currently open.
    #[must_use]
    pub fn open_store_count(&self) -> usize {
        self.open.lock().len()
    }

    /// Resolves the directory of a store under `base_dir`.
    #[must_use]
    pub fn store_dir(&self, base_dir: &Path, store_id: &str, options: &StoreOptions) -> PathBuf {
        if options.create_dir_by_store_id_only {
            base_dir.join(store_id)
        } else {
            base_dir
                .join(&self.app_id)
                .join(&self.user_id)
                .join(store_id)
        }
    }

    fn open_new(&self, store_id: &str, options: &StoreOptions) -> StorageResult<Arc<dyn KvStore>> {
        if options.encrypted {
            return Err(StorageError::NotSupported(
                "encrypted stores are not available".into(),
            ));
        }

        if options.memory_db {
            return Ok(Arc::new(InMemoryStore::with_options(
                store_id,
                options.clone(),
                self.network.clone(),
            )));
        }

        let base_dir = self
            .config
            .read()
            .as_ref()
            .map(|c| c.base_dir.clone())
            .ok_or_else(|| StorageError::invalid_args("manager config has no base directory"))?;
        let dir = self.store_dir(&base_dir, store_id, options);
        let store = FileStore::open(&dir, store_id, options.clone(), self.network.clone())?;
        Ok(Arc::new(store))
    }
}

fn validate_store_id(store_id: &str) -> StorageResult<()> {
    if store_id.is_empty() {
        return Err(StorageError::invalid_args("store id is empty"));
    }
    if store_id.contains(['/', '\\']) || store_id == "." || store_id == ".." {
        return Err(StorageError::invalid_args(format!(
            "store id is not a plain name: {store_id}"
        )));
    }
    Ok(())
}

/// Options that decide what kind of store an id names. Open-time flags
/// such as `create_if_missing` are ignored.
fn same_layout(open: &StoreOptions, requested: &StoreOptions) -> bool {
    open.memory_db == requested.memory_db
        && open.create_dir_by_store_id_only == requested.create_dir_by_store_id_only
        && open.encrypted == requested.encrypted
        && open.security == requested.security
}

impl KvManager for StoreManager {
    fn set_config(&self, config: KvManagerConfig) {
        debug!(base_dir = %config.base_dir.display(), "manager config set");
        *self.config.write() = Some(config);
    }

    fn get_store(&self, store_id: &str, options: &StoreOptions) -> StorageResult<Arc<dyn KvStore>> {
        validate_store_id(store_id)?;

        let mut open = self.open.lock();
        if let Some(existing) = open.get_mut(store_id) {
            if !same_layout(existing.store.options(), options) {
                return Err(StorageError::invalid_args(format!(
                    "store {store_id} is already open with different options"
                )));
            }
            existing.handles += 1;
            debug!(store_id, handles = existing.handles, "store handle reused");
            return Ok(Arc::clone(&existing.store));
        }

        let store = self.open_new(store_id, options)?;
        open.insert(
            store_id.to_string(),
            OpenStore {
                store: Arc::clone(&store),
                handles: 1,
            },
        );
        info!(store_id, app_id = %self.app_id, memory = options.memory_db, "store opened");
        Ok(store)
    }

    fn close_store(&self, store: &Arc<dyn KvStore>) -> StorageResult<()> {
        let store_id = store.store_id().to_string();
        let mut open = self.open.lock();

        let Some(entry) = open.get_mut(&store_id) else {
            return Err(StorageError::store_not_found(store_id));
        };
        if !Arc::ptr_eq(&entry.store, store) {
            return Err(StorageError::store_not_found(store_id));
        }

        entry.handles -= 1;
        if entry.handles > 0 {
            debug!(store_id = %store_id, handles = entry.handles, "store handle released");
            return Ok(());
        }

        if let Some(last) = open.remove(&store_id) {
            if let Err(e) = last.store.close() {
                warn!(store_id = %store_id, error = %e, "store close failed");
                return Err(e);
            }
        }
        info!(store_id = %store_id, "store closed");
        Ok(())
    }
}

impl std::fmt::Debug for StoreManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreManager")
            .field("app_id", &self.app_id)
            .field("user_id", &self.user_id)
            .field("config", &*self.config.read())
            .field("open_stores", &self.open_store_count())
            .finish()
    }
}
