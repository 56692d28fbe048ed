//! On-disk key-value store.
//!
//! Directory layout of one store:
//!
//! ```text
//! <store_dir>/
//! ├─ LOCK       # Advisory lock for single-process access
//! └─ data.log   # Append-only batch log
//! ```
//!
//! The full key space is held in memory and rebuilt from `data.log` on open.

use crate::engine::{Entry, KvStore, StoreOptions, SyncCallback, SyncMode};
use crate::error::{StorageError, StorageResult};
use crate::log::{scan_log, LogRecord};
use crate::sync::{validate_request, DeviceNetwork, PushJob};
use crate::table::Table;
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const LOCK_FILE: &str = "LOCK";
const LOG_FILE: &str = "data.log";

/// Log file handle and its committed length.
#[derive(Debug)]
struct LogFile {
    file: File,
    len: u64,
}

/// A persistent key-value store backed by a batch log.
///
/// # Durability
///
/// Every batch is appended and `sync_data`-ed before it becomes visible
/// to readers. A batch whose append fails is rolled back on disk.
#[derive(Debug)]
pub struct FileStore {
    store_id: String,
    options: StoreOptions,
    dir: PathBuf,
    table: Table,
    log: Mutex<LogFile>,
    network: Option<Arc<DeviceNetwork>>,
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates the store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the directory is missing and `create_if_missing` is false
    /// - another process holds the store (`Busy`)
    /// - the log is corrupted and `remove_corrupted` is false
    /// - I/O errors occur
    pub fn open(
        dir: &Path,
        store_id: impl Into<String>,
        options: StoreOptions,
        network: Option<Arc<DeviceNetwork>>,
    ) -> StorageResult<Self> {
        let store_id = store_id.into();

        if !dir.exists() {
            if options.create_if_missing {
                fs::create_dir_all(dir)?;
            } else {
                return Err(StorageError::store_not_found(store_id));
            }
        }
        if !dir.is_dir() {
            return Err(StorageError::invalid_args(format!(
                "store path is not a directory: {}",
                dir.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Busy { store_id });
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOG_FILE))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let scan = scan_log(&data);
        if let Some(corruption) = scan.corruption {
            if !options.remove_corrupted {
                return Err(StorageError::corrupted(format!(
                    "{}: {corruption}",
                    dir.display()
                )));
            }
            warn!(
                store_id = %store_id,
                dropped = data.len() as u64 - scan.valid_len,
                %corruption,
                "dropping corrupted log tail"
            );
            file.set_len(scan.valid_len)?;
            file.sync_all()?;
        }

        let table = Table::new();
        for record in &scan.records {
            match record {
                LogRecord::Put(entries) => table.apply_put(entries),
                LogRecord::Delete(keys) => table.apply_delete(keys),
            }
        }
        debug!(
            store_id = %store_id,
            records = scan.records.len(),
            entries = table.len(),
            "store recovered"
        );

        Ok(Self {
            store_id,
            options,
            dir: dir.to_path_buf(),
            table,
            log: Mutex::new(LogFile {
                file,
                len: scan.valid_len,
            }),
            network,
            _lock_file: lock_file,
        })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `record` and applies it to the table under the log lock, so
    /// the table sees batches in log order.
    fn commit(&self, record: &LogRecord) -> StorageResult<()> {
        let bytes = record.encode()?;
        let mut log = self.log.lock();
        let start = log.len;

        let written = write_at(&mut log.file, start, &bytes);

        if let Err(e) = written {
            // Keep the log free of torn records so later batches stay readable.
            if let Err(rollback) = log.file.set_len(start) {
                warn!(store_id = %self.store_id, error = %rollback, "log rollback failed");
            }
            return Err(e.into());
        }

        log.len = start + bytes.len() as u64;
        match record {
            LogRecord::Put(entries) => self.table.apply_put(entries),
            LogRecord::Delete(keys) => self.table.apply_delete(keys),
        }
        Ok(())
    }
}

fn write_at(file: &mut File, offset: u64, bytes: &[u8]) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(bytes)?;
    file.sync_data()
}

impl KvStore for FileStore {
    fn store_id(&self) -> &str {
        &self.store_id
    }

    fn options(&self) -> &StoreOptions {
        &self.options
    }

    fn put_batch(&self, entries: &[Entry]) -> StorageResult<()> {
        self.table.ensure_open()?;
        if entries.is_empty() {
            return Ok(());
        }
        self.commit(&LogRecord::Put(entries.to_vec()))
    }

    fn delete_batch(&self, keys: &[Vec<u8>]) -> StorageResult<()> {
        self.table.ensure_open()?;
        if keys.is_empty() {
            return Ok(());
        }
        self.commit(&LogRecord::Delete(keys.to_vec()))
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
        let log = self.log.lock();
        log.file.sync_all()?;
        Ok(())
    }
}
