//! Runtime store: unified data objects over one engine store.

use super::handle::StoreHandle;
use super::traits::DataStore;
use super::StoreState;
use crate::codec::{CborDataCodec, DataCodec};
use crate::config::StoreConfig;
use crate::data::{Summary, UnifiedData};
use crate::error::{CoreError, CoreResult, Status};
use crate::key;
use crate::types::UdStoreType;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use udmf_storage::{Entry, KvManager, KvStore, SyncMode, SyncStatus};

struct Inner {
    state: StoreState,
    handle: Option<StoreHandle>,
}

/// Stores unified data objects in one named engine store.
///
/// Each object is written as one runtime entry under its group key and one
/// entry per record under the member keys. The store adds no locking of its
/// own: concurrent calls are isolated only by the engine's atomic batches, so
/// two concurrent updates of the same key may interleave.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use udmf_core::{
///     DataStore, PlainText, RecordValue, Runtime, RuntimeStore, StoreConfig, UnifiedData,
///     UnifiedKey, UnifiedRecord,
/// };
/// use udmf_storage::StoreManager;
///
/// let manager = Arc::new(StoreManager::new("distributeddata", "default"));
/// let store = RuntimeStore::new("drag", manager)
///     .with_config(StoreConfig::new().memory_db(true));
/// store.init().unwrap();
///
/// let data = UnifiedData::new(Runtime::new(UnifiedKey::new("drag", "com.x", "g1")))
///     .with_record(UnifiedRecord::new(RecordValue::PlainText(PlainText::new("hi"))));
/// store.put(&data).unwrap();
///
/// let read = store.get("udmf://drag/com.x/g1").unwrap();
/// assert_eq!(read, data);
/// ```
pub struct RuntimeStore {
    store_id: String,
    manager: Arc<dyn KvManager>,
    config: StoreConfig,
    codec: Arc<dyn DataCodec>,
    inner: RwLock<Inner>,
}

impl RuntimeStore {
    /// Creates a store named `store_id` served by `manager`.
    ///
    /// Nothing is opened until [`DataStore::init`].
    pub fn new(store_id: impl Into<String>, manager: Arc<dyn KvManager>) -> Self {
        let store_id = store_id.into();
        info!(store_id = %store_id, "runtime store created");
        Self {
            store_id,
            manager,
            config: StoreConfig::default(),
            codec: Arc::new(CborDataCodec),
            inner: RwLock::new(Inner {
                state: StoreState::Uninitialized,
                handle: None,
            }),
        }
    }

    /// Replaces the configuration used by [`DataStore::init`].
    #[must_use]
    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the record and runtime codec.
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn DataCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> StoreState {
        self.inner.read().state
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the engine store if the store is ready.
    fn kv(&self) -> CoreResult<Arc<dyn KvStore>> {
        let inner = self.inner.read();
        match (inner.state, inner.handle.as_ref().and_then(StoreHandle::store)) {
            (StoreState::Ready, Some(store)) => Ok(Arc::clone(store)),
            (state, _) => {
                error!(store_id = %self.store_id, %state, "store used outside ready state");
                Err(CoreError::NotReady { state })
            }
        }
    }

    fn scan(&self, kv: &dyn KvStore, prefix: &str) -> CoreResult<Vec<Entry>> {
        kv.get_entries(prefix.as_bytes()).map_err(|e| {
            error!(store_id = %self.store_id, prefix, error = %e, "get entries failed");
            CoreError::from(e)
        })
    }

    /// Reads the object under `key` into `data`.
    ///
    /// On a decode failure `data` keeps whatever was read before it.
    fn read_into(&self, kv: &dyn KvStore, key: &str, data: &mut UnifiedData) -> CoreResult<()> {
        let entries: Vec<Entry> = self
            .scan(kv, key)?
            .into_iter()
            .filter(|e| key::belongs_to_group(&e.key, key))
            .collect();
        if entries.is_empty() {
            info!(store_id = %self.store_id, key, "no entries found");
            return Ok(());
        }

        let mut positioned = Vec::with_capacity(entries.len());
        let mut outcome = Ok(());
        for entry in &entries {
            if entry.key == key.as_bytes() {
                match self.codec.decode_runtime(&entry.value) {
                    Ok(runtime) => data.runtime = Some(runtime),
                    Err(e) => {
                        error!(store_id = %self.store_id, key, error = %e, "decode runtime failed");
                        outcome = Err(CoreError::unknown(format!("decode runtime: {e}")));
                        break;
                    }
                }
            } else {
                match self.codec.decode_record(&entry.value) {
                    Ok(positioned_record) => positioned.push(positioned_record),
                    Err(e) => {
                        error!(
                            store_id = %self.store_id,
                            key = %entry.key_lossy(),
                            error = %e,
                            "decode record failed"
                        );
                        outcome = Err(CoreError::unknown(format!("decode record: {e}")));
                        break;
                    }
                }
            }
        }

        positioned.sort_by_key(|(position, _)| *position);
        data.records.extend(positioned.into_iter().map(|(_, record)| record));
        outcome
    }

    /// Deletes every entry under `prefix` accepted by `keep`.
    fn remove_matching(
        &self,
        kv: &dyn KvStore,
        prefix: &str,
        keep: impl Fn(&[u8]) -> bool,
    ) -> CoreResult<()> {
        let keys: Vec<Vec<u8>> = self
            .scan(kv, prefix)?
            .into_iter()
            .map(|e| e.key)
            .filter(|k| keep(k))
            .collect();
        if keys.is_empty() {
            info!(store_id = %self.store_id, prefix, "nothing to delete");
            return Ok(());
        }

        kv.delete_batch(&keys).map_err(|e| {
            error!(store_id = %self.store_id, prefix, error = %e, "delete batch failed");
            CoreError::from(e)
        })?;
        debug!(store_id = %self.store_id, prefix, count = keys.len(), "entries deleted");
        Ok(())
    }
}

impl DataStore for RuntimeStore {
    fn store_name(&self) -> &str {
        &self.store_id
    }

    fn store_type(&self) -> UdStoreType {
        UdStoreType::Runtime
    }

    fn init(&self) -> CoreResult<()> {
        let mut inner = self.inner.write();
        if inner.state == StoreState::Ready {
            return Ok(());
        }

        self.manager.set_config(self.config.manager_config());
        let handle = StoreHandle::acquire(
            Arc::clone(&self.manager),
            &self.store_id,
            &self.config.store_options(),
        )
        .map_err(|e| {
            error!(store_id = %self.store_id, error = %e, "get kv store failed");
            CoreError::from(e)
        })?;

        inner.handle = Some(handle);
        inner.state = StoreState::Ready;
        info!(store_id = %self.store_id, "runtime store ready");
        Ok(())
    }

    fn close(&self) {
        let mut inner = self.inner.write();
        if let Some(mut handle) = inner.handle.take() {
            if let Err(e) = handle.release() {
                error!(store_id = %self.store_id, error = %e, "close kv store failed");
            }
        }
        if inner.state != StoreState::Closed {
            info!(store_id = %self.store_id, "runtime store closed");
        }
        inner.state = StoreState::Closed;
    }

    fn put(&self, data: &UnifiedData) -> CoreResult<()> {
        let kv = self.kv()?;
        let runtime = data
            .runtime()
            .ok_or_else(|| CoreError::invalid_parameters("unified data has no runtime"))?;
        let group = key::group_key(runtime);
        key::validate_group_key(&group)?;

        let mut entries = Vec::with_capacity(data.records.len() + 1);
        for (position, record) in data.records.iter().enumerate() {
            key::validate_uid(&record.uid)?;
            let position = u32::try_from(position)
                .map_err(|_| CoreError::invalid_parameters("too many records"))?;
            let value = self.codec.encode_record(position, record).map_err(|e| {
                error!(store_id = %self.store_id, uid = %record.uid, error = %e, "encode record failed");
                CoreError::invalid_parameters(format!("encode record {}: {e}", record.uid))
            })?;
            entries.push(Entry::new(key::member_key(&group, &record.uid), value));
        }

        let value = self.codec.encode_runtime(runtime).map_err(|e| {
            error!(store_id = %self.store_id, key = %group, error = %e, "encode runtime failed");
            CoreError::unknown(format!("encode runtime: {e}"))
        })?;
        entries.push(Entry::new(group.clone(), value));

        kv.put_batch(&entries).map_err(|e| {
            error!(store_id = %self.store_id, key = %group, error = %e, "put batch failed");
            CoreError::from(e)
        })?;
        debug!(store_id = %self.store_id, key = %group, count = entries.len(), "unified data stored");
        Ok(())
    }

    fn get(&self, key: &str) -> CoreResult<UnifiedData> {
        let kv = self.kv()?;
        let mut data = UnifiedData::default();
        self.read_into(kv.as_ref(), key, &mut data)?;
        Ok(data)
    }

    fn get_summary(&self, key: &str) -> CoreResult<Summary> {
        self.kv()?;
        let data = self.get(key).map_err(|e| {
            error!(store_id = %self.store_id, key, error = %e, "get summary failed");
            CoreError::db_error(format!("get {key}: {e}"))
        })?;
        Ok(Summary::from_records(&data.records))
    }

    fn update(&self, data: &UnifiedData) -> CoreResult<()> {
        self.kv()?;
        let group = data
            .runtime()
            .map(key::group_key)
            .ok_or_else(|| CoreError::invalid_parameters("unified data has no runtime"))?;

        self.delete(&group).map_err(|e| {
            error!(store_id = %self.store_id, key = %group, error = %e, "update: delete failed");
            CoreError::db_error(format!("delete {group}: {e}"))
        })?;
        self.put(data).map_err(|e| {
            error!(store_id = %self.store_id, key = %group, error = %e, "update: put failed");
            CoreError::db_error(format!("put {group}: {e}"))
        })
    }

    fn delete(&self, key: &str) -> CoreResult<()> {
        let kv = self.kv()?;
        self.remove_matching(kv.as_ref(), key, |k| key::belongs_to_group(k, key))
    }

    fn delete_batch(&self, keys: &[String]) -> CoreResult<()> {
        self.kv()?;
        if keys.is_empty() {
            debug!(store_id = %self.store_id, "empty delete batch");
            return Ok(());
        }

        let mut result = Ok(());
        for key in keys {
            if result.is_ok() {
                result = self.delete(key);
            }
        }
        result
    }

    fn get_datas(&self, prefix: &str) -> CoreResult<Vec<UnifiedData>> {
        let kv = self.kv()?;
        let entries = self.scan(kv.as_ref(), prefix)?;

        let mut datas = Vec::new();
        for entry in &entries {
            let group = entry.key_lossy();
            if !key::is_group_key(&group) {
                continue;
            }
            let mut data = UnifiedData::default();
            if let Err(e) = self.read_into(kv.as_ref(), &group, &mut data) {
                warn!(store_id = %self.store_id, key = %group, error = %e, "partial read");
            }
            datas.push(data);
        }
        Ok(datas)
    }

    fn sync(&self, devices: &[String]) -> CoreResult<()> {
        let kv = self.kv()?;
        let store_id = self.store_id.clone();
        let on_complete = Box::new(move |outcome: &BTreeMap<String, SyncStatus>| {
            for (device, status) in outcome {
                info!(store_id = %store_id, device = %device, status = ?status, "sync finished");
            }
        });

        kv.sync(devices, SyncMode::PushOnly, on_complete).map_err(|e| {
            error!(store_id = %self.store_id, error = %e, "sync request failed");
            CoreError::from(e)
        })
    }

    fn clear(&self) -> CoreResult<()> {
        let kv = self.kv()?;
        match self.remove_matching(kv.as_ref(), key::DATA_PREFIX, |_| true) {
            Err(e) if e.status() == Status::DbError => Err(e),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for RuntimeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeStore")
            .field("store_id", &self.store_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Drop for RuntimeStore {
    fn drop(&mut self) {
        self.close();
        info!(store_id = %self.store_id, "runtime store dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        FileRef, Form, PlainText, RecordValue, Runtime, UnifiedKey, UnifiedRecord,
    };
    use udmf_storage::StoreManager;

    const GROUP: &str = "udmf://drag/com.example/g1";

    fn memory_store() -> RuntimeStore {
        let manager = Arc::new(StoreManager::new("distributeddata", "default"));
        let store =
            RuntimeStore::new("drag", manager).with_config(StoreConfig::new().memory_db(true));
        store.init().unwrap();
        store
    }

    fn sample(group_id: &str) -> UnifiedData {
        UnifiedData::new(Runtime::new(UnifiedKey::new("drag", "com.example", group_id)))
            .with_record(UnifiedRecord::with_uid(
                "zz",
                RecordValue::PlainText(PlainText::new("hello")),
            ))
            .with_record(UnifiedRecord::with_uid(
                "aa",
                RecordValue::Image(FileRef::new("file://img.png")),
            ))
            .with_record(UnifiedRecord::with_uid(
                "mm",
                RecordValue::SystemDefinedForm(Form {
                    form_id: 1,
                    form_name: "f".into(),
                    ..Form::default()
                }),
            ))
    }

    #[test]
    fn put_then_get_keeps_record_order() {
        let store = memory_store();
        let data = sample("g1");
        store.put(&data).unwrap();

        let read = store.get(GROUP).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn put_writes_one_entry_per_record_plus_runtime() {
        let store = memory_store();
        store.put(&sample("g1")).unwrap();

        let kv = store.kv().unwrap();
        let keys: Vec<String> = kv
            .get_entries(GROUP.as_bytes())
            .unwrap()
            .iter()
            .map(Entry::key_lossy)
            .collect();
        assert_eq!(
            keys,
            [
                GROUP.to_string(),
                format!("{GROUP}/aa"),
                format!("{GROUP}/mm"),
                format!("{GROUP}/zz"),
            ]
        );
    }

    #[test]
    fn get_missing_is_empty_ok() {
        let store = memory_store();
        let read = store.get(GROUP).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn get_does_not_cross_group_boundary() {
        let store = memory_store();
        store.put(&sample("g1")).unwrap();
        store.put(&sample("g10")).unwrap();

        let read = store.get(GROUP).unwrap();
        assert_eq!(read.records.len(), 3);

        store.delete(GROUP).unwrap();
        assert!(store.get(GROUP).unwrap().is_empty());
        assert_eq!(store.get("udmf://drag/com.example/g10").unwrap().records.len(), 3);
    }

    #[test]
    fn put_without_runtime_is_invalid() {
        let store = memory_store();
        let err = store.put(&UnifiedData::default()).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameters);
    }

    #[test]
    fn put_rejects_key_with_empty_segment() {
        let store = memory_store();
        for runtime in [
            Runtime::default(),
            Runtime::new(UnifiedKey::new("drag", "", "g1")),
        ] {
            let data = UnifiedData::new(runtime)
                .with_record(UnifiedRecord::new(RecordValue::PlainText(PlainText::new("x"))));
            let err = store.put(&data).unwrap_err();
            assert_eq!(err.status(), Status::InvalidParameters);
        }
        assert!(store.get(key::DATA_PREFIX).unwrap().is_empty());
    }

    #[test]
    fn put_rejects_uid_with_separator() {
        let store = memory_store();
        let data = UnifiedData::new(Runtime::new(UnifiedKey::new("drag", "com.example", "g1")))
            .with_record(UnifiedRecord::with_uid(
                "a/b",
                RecordValue::PlainText(PlainText::new("x")),
            ));
        let err = store.put(&data).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameters);
        assert!(store.get(GROUP).unwrap().is_empty());
    }

    #[test]
    fn corrupt_runtime_is_unknown() {
        let store = memory_store();
        store.put(&sample("g1")).unwrap();
        store
            .kv()
            .unwrap()
            .put_batch(&[Entry::new(GROUP, vec![0xff])])
            .unwrap();

        let err = store.get(GROUP).unwrap_err();
        assert_eq!(err.status(), Status::Unknown);
    }

    #[test]
    fn summary_counts_records_only() {
        let store = memory_store();
        store.put(&sample("g1")).unwrap();

        let summary = store.get_summary(GROUP).unwrap();
        assert_eq!(summary.summary["general.plain-text"], 5);
        assert_eq!(summary.summary["general.image"], 14);
        assert_eq!(summary.summary["openharmony.form"], 5);
        assert_eq!(summary.total_size, 24);
    }

    #[test]
    fn update_replaces_records() {
        let store = memory_store();
        store.put(&sample("g1")).unwrap();

        let replacement = UnifiedData::new(Runtime::new(UnifiedKey::new("drag", "com.example", "g1")))
            .with_record(UnifiedRecord::with_uid(
                "only",
                RecordValue::PlainText(PlainText::new("new")),
            ));
        store.update(&replacement).unwrap();

        assert_eq!(store.get(GROUP).unwrap(), replacement);
    }

    #[test]
    fn delete_batch_of_nothing_is_ok() {
        let store = memory_store();
        store.delete_batch(&[]).unwrap();
    }

    #[test]
    fn get_datas_returns_groups_only() {
        let store = memory_store();
        store.put(&sample("g1")).unwrap();
        store.put(&sample("g2")).unwrap();

        let datas = store.get_datas("udmf://drag/").unwrap();
        assert_eq!(datas.len(), 2);
        assert!(datas.iter().all(|d| d.records.len() == 3));
    }

    #[test]
    fn clear_removes_everything() {
        let store = memory_store();
        store.put(&sample("g1")).unwrap();
        store.put(&sample("g2")).unwrap();

        store.clear().unwrap();
        assert!(store.get_datas(key::DATA_PREFIX).unwrap().is_empty());
    }

    #[test]
    fn operations_require_ready() {
        let manager = Arc::new(StoreManager::new("distributeddata", "default"));
        let store =
            RuntimeStore::new("drag", manager).with_config(StoreConfig::new().memory_db(true));
        assert_eq!(store.state(), StoreState::Uninitialized);
        assert!(matches!(
            store.get(GROUP),
            Err(CoreError::NotReady {
                state: StoreState::Uninitialized
            })
        ));

        store.init().unwrap();
        store.close();
        assert_eq!(store.get(GROUP).unwrap_err().status(), Status::NotReady);
        assert_eq!(store.get_summary(GROUP).unwrap_err().status(), Status::NotReady);
    }

    #[test]
    fn close_is_idempotent_and_safe_before_init() {
        let manager = Arc::new(StoreManager::new("distributeddata", "default"));
        let store = RuntimeStore::new("drag", manager.clone())
            .with_config(StoreConfig::new().memory_db(true));
        store.close();
        store.close();
        assert_eq!(store.state(), StoreState::Closed);

        store.init().unwrap();
        store.init().unwrap();
        assert_eq!(manager.open_store_count(), 1);
        store.close();
        store.close();
        assert_eq!(manager.open_store_count(), 0);
    }

    #[test]
    fn disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new().base_dir(dir.path());
        let manager: Arc<dyn KvManager> = Arc::new(StoreManager::new("distributeddata", "default"));

        let data = sample("g1");
        {
            let store = RuntimeStore::new("drag", Arc::clone(&manager)).with_config(config.clone());
            store.init().unwrap();
            store.put(&data).unwrap();
        }
        assert!(dir.path().join("drag").is_dir());

        let store = RuntimeStore::new("drag", manager).with_config(config);
        store.init().unwrap();
        assert_eq!(store.get(GROUP).unwrap(), data);
    }

    #[test]
    fn init_fails_for_unopenable_store() {
        let manager = Arc::new(StoreManager::new("distributeddata", "default"));
        let store = RuntimeStore::new("a/b", manager).with_config(StoreConfig::new().memory_db(true));
        assert_eq!(store.init().unwrap_err().status(), Status::DbError);
        assert_eq!(store.state(), StoreState::Uninitialized);
    }

    #[test]
    fn store_identity() {
        let store = memory_store();
        assert_eq!(store.store_name(), "drag");
        assert_eq!(store.store_type(), UdStoreType::Runtime);
    }
}
