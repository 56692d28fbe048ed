//! The data store trait shared by runtime and persistent stores.

use crate::data::{Summary, UnifiedData};
use crate::error::CoreResult;
use crate::types::UdStoreType;

/// Logical store of unified data objects.
///
/// Operations work on whole objects addressed by their group key. All
/// operations except [`DataStore::init`] and [`DataStore::close`] require
/// the store to be ready and fail with [`crate::CoreError::NotReady`]
/// otherwise.
pub trait DataStore: Send + Sync {
    /// Returns the name the store was created with.
    fn store_name(&self) -> &str;

    /// Returns the kind of store.
    fn store_type(&self) -> UdStoreType;

    /// Acquires the engine handle. A no-op on a ready store.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot open the store.
    fn init(&self) -> CoreResult<()>;

    /// Releases the engine handle. Safe to call at any time, any number of times.
    fn close(&self);

    /// Writes an object as one atomic batch.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters` if the object has no runtime, a malformed group
    ///   key, an unusable record uid, or a record that fails to encode
    /// - `Unknown` if the runtime block fails to encode
    /// - `DbError` if the engine rejects the batch
    fn put(&self, data: &UnifiedData) -> CoreResult<()>;

    /// Reads the object stored under `key`.
    ///
    /// Nothing stored under `key` is not an error: the result is an empty
    /// object.
    ///
    /// # Errors
    ///
    /// - `Unknown` if a stored value fails to decode
    /// - `DbError` if the scan fails
    fn get(&self, key: &str) -> CoreResult<UnifiedData>;

    /// Returns per-kind record sizes of the object under `key`.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying read is reported as `DbError`.
    fn get_summary(&self, key: &str) -> CoreResult<Summary>;

    /// Replaces an object: delete by its group key, then put.
    ///
    /// The two steps are not atomic. A reader in between sees no object.
    ///
    /// # Errors
    ///
    /// A failure of either step is reported as `DbError`.
    fn update(&self, data: &UnifiedData) -> CoreResult<()>;

    /// Deletes the object under `key`. Nothing stored is not an error.
    ///
    /// # Errors
    ///
    /// `DbError` if the scan or the batch delete fails.
    fn delete(&self, key: &str) -> CoreResult<()>;

    /// Deletes several objects in order, stopping at the first failure.
    ///
    /// Keys after a failed one are never deleted; the first failure is returned.
    ///
    /// # Errors
    ///
    /// The first error returned by [`DataStore::delete`].
    fn delete_batch(&self, keys: &[String]) -> CoreResult<()>;

    /// Reads every object whose group key starts with `prefix`.
    ///
    /// Objects that fail to read are returned as far as they were read.
    ///
    /// # Errors
    ///
    /// `DbError` if the scan fails.
    fn get_datas(&self, prefix: &str) -> CoreResult<Vec<UnifiedData>>;

    /// Requests a push of the store to `devices`.
    ///
    /// Success means the request was accepted; per-device results are only logged.
    ///
    /// # Errors
    ///
    /// `DbError` if the engine rejects the request.
    fn sync(&self, devices: &[String]) -> CoreResult<()>;

    /// Deletes every object in the store.
    ///
    /// # Errors
    ///
    /// `DbError` if the engine fails.
    fn clear(&self) -> CoreResult<()>;
}
