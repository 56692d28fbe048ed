//! Fault injection for engine and codec error paths.
//!
//! [`FaultyManager`] wraps a real manager and hands out [`FaultyKvStore`]s
//! that forward to the real stores unless a switch in the shared [`Faults`]
//! is set. Every engine call is counted so tests can assert that a failing
//! operation never reached the engine.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use udmf_codec::{CodecError, CodecResult};
use udmf_core::{CborDataCodec, DataCodec, Runtime, UnifiedRecord};
use udmf_storage::{
    Entry, KvManager, KvManagerConfig, KvStore, StorageError, StorageResult, StoreManager,
    StoreOptions, SyncCallback, SyncMode, SyncStatus,
};

/// Per-device outcome of one finished sync.
pub type SyncOutcome = BTreeMap<String, SyncStatus>;

/// Shared failure switches and call counters.
#[derive(Debug, Default)]
pub struct Faults {
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
    fail_scan: AtomicBool,
    fail_sync: AtomicBool,
    fail_delete_under: Mutex<Option<Vec<u8>>>,
    sync_watchers: Mutex<Vec<Sender<SyncOutcome>>>,
    put_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    scan_calls: AtomicUsize,
    sync_calls: AtomicUsize,
}

impl Faults {
    /// Makes every batch put fail.
    pub fn fail_put(&self, on: bool) {
        self.fail_put.store(on, Ordering::SeqCst);
    }

    /// Makes every batch delete fail.
    pub fn fail_delete(&self, on: bool) {
        self.fail_delete.store(on, Ordering::SeqCst);
    }

    /// Makes every prefix scan fail.
    pub fn fail_scan(&self, on: bool) {
        self.fail_scan.store(on, Ordering::SeqCst);
    }

    /// Makes every sync request fail.
    pub fn fail_sync(&self, on: bool) {
        self.fail_sync.store(on, Ordering::SeqCst);
    }

    /// Makes batch deletes fail when any key starts with `prefix`.
    pub fn fail_delete_under(&self, prefix: &str) {
        *self.fail_delete_under.lock() = Some(prefix.as_bytes().to_vec());
    }

    /// Returns a receiver that gets the outcome of every later sync.
    ///
    /// The outcome is sent after the store's own completion callback has
    /// returned, so a callback that panics never reports.
    pub fn watch_sync(&self) -> Receiver<SyncOutcome> {
        let (tx, rx) = mpsc::channel();
        self.sync_watchers.lock().push(tx);
        rx
    }

    /// Clears every switch. Counters are kept.
    pub fn heal(&self) {
        self.fail_put(false);
        self.fail_delete(false);
        self.fail_scan(false);
        self.fail_sync(false);
        *self.fail_delete_under.lock() = None;
    }

    /// Number of batch puts that reached the engine wrapper.
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Number of batch deletes that reached the engine wrapper.
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Number of prefix scans that reached the engine wrapper.
    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    /// Number of sync requests that reached the engine wrapper.
    pub fn sync_calls(&self) -> usize {
        self.sync_calls.load(Ordering::SeqCst)
    }

    fn delete_blocked(&self, keys: &[Vec<u8>]) -> bool {
        if self.fail_delete.load(Ordering::SeqCst) {
            return true;
        }
        match self.fail_delete_under.lock().as_deref() {
            Some(prefix) => keys.iter().any(|k| k.starts_with(prefix)),
            None => false,
        }
    }
}

fn injected(op: &str) -> StorageError {
    StorageError::Injected(format!("{op} failure"))
}

/// A store that forwards to a real store unless a fault is switched on.
pub struct FaultyKvStore {
    inner: Arc<dyn KvStore>,
    faults: Arc<Faults>,
}

impl FaultyKvStore {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn KvStore>, faults: Arc<Faults>) -> Self {
        Self { inner, faults }
    }
}

impl KvStore for FaultyKvStore {
    fn store_id(&self) -> &str {
        self.inner.store_id()
    }

    fn options(&self) -> &StoreOptions {
        self.inner.options()
    }

    fn put_batch(&self, entries: &[Entry]) -> StorageResult<()> {
        self.faults.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_put.load(Ordering::SeqCst) {
            return Err(injected("put"));
        }
        self.inner.put_batch(entries)
    }

    fn delete_batch(&self, keys: &[Vec<u8>]) -> StorageResult<()> {
        self.faults.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.delete_blocked(keys) {
            return Err(injected("delete"));
        }
        self.inner.delete_batch(keys)
    }

    fn get_entries(&self, prefix: &[u8]) -> StorageResult<Vec<Entry>> {
        self.faults.scan_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_scan.load(Ordering::SeqCst) {
            return Err(injected("scan"));
        }
        self.inner.get_entries(prefix)
    }

    fn sync(&self, devices: &[String], mode: SyncMode, on_complete: SyncCallback) -> StorageResult<()> {
        self.faults.sync_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_sync.load(Ordering::SeqCst) {
            return Err(injected("sync"));
        }
        let watchers = self.faults.sync_watchers.lock().clone();
        if watchers.is_empty() {
            return self.inner.sync(devices, mode, on_complete);
        }
        let observed: SyncCallback = Box::new(move |outcome: &SyncOutcome| {
            on_complete(outcome);
            for watcher in &watchers {
                let _ = watcher.send(outcome.clone());
            }
        });
        self.inner.sync(devices, mode, observed)
    }

    fn close(&self) -> StorageResult<()> {
        self.inner.close()
    }
}

/// A manager whose stores honour a shared set of [`Faults`].
pub struct FaultyManager {
    inner: StoreManager,
    faults: Arc<Faults>,
    handed_out: Mutex<Vec<(Arc<dyn KvStore>, Arc<dyn KvStore>)>>,
}

impl FaultyManager {
    /// Wraps `inner`.
    pub fn new(inner: StoreManager) -> Self {
        Self {
            inner,
            faults: Arc::new(Faults::default()),
            handed_out: Mutex::new(Vec::new()),
        }
    }

    /// Returns the fault switches shared by every store of this manager.
    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    /// Returns the wrapped manager.
    pub fn inner(&self) -> &StoreManager {
        &self.inner
    }

    /// Counts raw entries under `prefix` in an open store, bypassing faults.
    ///
    /// Returns 0 if the store is not open.
    pub fn raw_count(&self, store_id: &str, prefix: &str) -> usize {
        self.handed_out
            .lock()
            .iter()
            .find(|(_, real)| real.store_id() == store_id)
            .and_then(|(_, real)| real.get_entries(prefix.as_bytes()).ok())
            .map_or(0, |entries| entries.len())
    }
}

impl KvManager for FaultyManager {
    fn set_config(&self, config: KvManagerConfig) {
        self.inner.set_config(config);
    }

    fn get_store(&self, store_id: &str, options: &StoreOptions) -> StorageResult<Arc<dyn KvStore>> {
        let real = self.inner.get_store(store_id, options)?;
        let wrapped: Arc<dyn KvStore> =
            Arc::new(FaultyKvStore::new(Arc::clone(&real), Arc::clone(&self.faults)));
        self.handed_out.lock().push((Arc::clone(&wrapped), real));
        Ok(wrapped)
    }

    fn close_store(&self, store: &Arc<dyn KvStore>) -> StorageResult<()> {
        let real = {
            let mut handed_out = self.handed_out.lock();
            let position = handed_out
                .iter()
                .position(|(wrapped, _)| Arc::ptr_eq(wrapped, store))
                .ok_or_else(|| StorageError::store_not_found(store.store_id()))?;
            handed_out.swap_remove(position).1
        };
        self.inner.close_store(&real)
    }
}

/// A codec that fails selected operations and otherwise uses CBOR.
#[derive(Debug, Default)]
pub struct FailingCodec {
    /// Fail record encoding.
    pub encode_record: AtomicBool,
    /// Fail record decoding.
    pub decode_record: AtomicBool,
    /// Fail runtime encoding.
    pub encode_runtime: AtomicBool,
    /// Fail runtime decoding.
    pub decode_runtime: AtomicBool,
}

impl FailingCodec {
    /// Creates a codec with every failure switched off.
    pub fn new() -> Self {
        Self::default()
    }

    fn check(flag: &AtomicBool, encode: bool) -> CodecResult<()> {
        if !flag.load(Ordering::SeqCst) {
            return Ok(());
        }
        Err(if encode {
            CodecError::encoding_failed("injected")
        } else {
            CodecError::decoding_failed("injected")
        })
    }
}

impl DataCodec for FailingCodec {
    fn encode_record(&self, position: u32, record: &UnifiedRecord) -> CodecResult<Vec<u8>> {
        Self::check(&self.encode_record, true)?;
        CborDataCodec.encode_record(position, record)
    }

    fn decode_record(&self, bytes: &[u8]) -> CodecResult<(u32, UnifiedRecord)> {
        Self::check(&self.decode_record, false)?;
        CborDataCodec.decode_record(bytes)
    }

    fn encode_runtime(&self, runtime: &Runtime) -> CodecResult<Vec<u8>> {
        Self::check(&self.encode_runtime, true)?;
        CborDataCodec.encode_runtime(runtime)
    }

    fn decode_runtime(&self, bytes: &[u8]) -> CodecResult<Runtime> {
        Self::check(&self.decode_runtime, false)?;
        CborDataCodec.decode_runtime(bytes)
    }
}
