//! Test fixtures and store helpers.

use crate::faults::{FaultyManager, Faults};
use std::sync::{Arc, Once};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;
use udmf_core::{
    key, DataCodec, DataStore, FileRef, Form, PlainText, RecordValue, Runtime, RuntimeStore,
    StoreConfig, UnifiedData, UnifiedKey, UnifiedRecord,
};
use udmf_storage::{KvManager, StoreManager};

/// Store id used by the fixtures.
pub const TEST_STORE_ID: &str = "drag";

/// Installs a test-friendly tracing subscriber once per process.
///
/// Honours `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// An initialized runtime store with automatic cleanup.
pub struct TestStore {
    /// The store.
    pub store: RuntimeStore,
    /// The manager serving the store.
    pub manager: Arc<FaultyManager>,
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a ready in-memory store.
    pub fn memory() -> Self {
        Self::build(StoreConfig::new().memory_db(true), None, None)
    }

    /// Creates a ready in-memory store that uses `codec`.
    pub fn memory_with_codec(codec: Arc<dyn DataCodec>) -> Self {
        Self::build(StoreConfig::new().memory_db(true), None, Some(codec))
    }

    /// Creates a ready on-disk store in a fresh temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = StoreConfig::new().base_dir(temp_dir.path());
        Self::build(config, Some(temp_dir), None)
    }

    fn build(
        config: StoreConfig,
        temp_dir: Option<TempDir>,
        codec: Option<Arc<dyn DataCodec>>,
    ) -> Self {
        init_tracing();
        let manager = Arc::new(FaultyManager::new(StoreManager::new(
            config.app_id.clone(),
            config.user_id.clone(),
        )));
        let mut store =
            RuntimeStore::new(TEST_STORE_ID, Arc::clone(&manager) as Arc<dyn KvManager>)
                .with_config(config);
        if let Some(codec) = codec {
            store = store.with_codec(codec);
        }
        store.init().expect("Failed to init runtime store");
        Self {
            store,
            manager,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the fault switches of the engine under the store.
    pub fn faults(&self) -> &Faults {
        self.manager.faults()
    }

    /// Returns the temporary directory if on-disk.
    pub fn path(&self) -> Option<&std::path::Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }

    /// Returns the number of raw engine entries under `prefix`.
    pub fn raw_count(&self, prefix: &str) -> usize {
        self.manager.raw_count(TEST_STORE_ID, prefix)
    }
}

impl std::ops::Deref for TestStore {
    type Target = RuntimeStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a ready in-memory store.
pub fn with_memory_store<F, R>(f: F) -> R
where
    F: FnOnce(&TestStore) -> R,
{
    let store = TestStore::memory();
    f(&store)
}

/// Returns the group key of an object.
pub fn group_key_of(data: &UnifiedData) -> String {
    data.runtime()
        .map(key::group_key)
        .expect("unified data has no runtime")
}

/// Builds an object under `udmf://drag/com.example.test/<group_id>` with
/// `records` records of mixed kinds.
///
/// Uids are chosen so that their key order differs from insertion order.
pub fn sample_data(group_id: &str, records: usize) -> UnifiedData {
    let runtime = Runtime {
        create_time: 1_700_000_000_000,
        last_modified_time: 1_700_000_000_500,
        source_package: "com.example.test".into(),
        device_id: "local".into(),
        record_total_num: u32::try_from(records).unwrap_or(u32::MAX),
        ..Runtime::new(UnifiedKey::new("drag", "com.example.test", group_id))
    };
    let mut data = UnifiedData::new(runtime);
    for i in 0..records {
        let value = match i % 3 {
            0 => RecordValue::PlainText(PlainText::new(format!("text {i}"))),
            1 => RecordValue::Image(FileRef::new(format!("file://media/{i}.png"))),
            _ => RecordValue::SystemDefinedForm(Form {
                form_id: i32::try_from(i).unwrap_or(i32::MAX),
                form_name: format!("form{i}"),
                bundle_name: "com.example.test".into(),
                ability_name: "Main".into(),
                module: "entry".into(),
                ..Form::default()
            }),
        };
        let uid = format!("{}-{i}", (b'z' - (i % 26) as u8) as char);
        data.add_record(UnifiedRecord::with_uid(uid, value));
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fixture_is_ready() {
        with_memory_store(|store| {
            assert_eq!(store.state(), udmf_core::StoreState::Ready);
            assert!(store.path().is_none());
        });
    }

    #[test]
    fn file_fixture_creates_store_dir() {
        let store = TestStore::file();
        let dir = store.path().unwrap().join(TEST_STORE_ID);
        assert!(dir.is_dir());
    }

    #[test]
    fn sample_uids_are_not_in_key_order() {
        let data = sample_data("g", 3);
        let uids: Vec<&str> = data.records.iter().map(|r| r.uid.as_str()).collect();
        assert_eq!(uids, ["z-0", "y-1", "x-2"]);
    }

    #[test]
    fn raw_count_sees_every_entry() {
        let store = TestStore::memory();
        store.put(&sample_data("g1", 4)).unwrap();
        assert_eq!(store.raw_count(key::DATA_PREFIX), 5);
    }
}
