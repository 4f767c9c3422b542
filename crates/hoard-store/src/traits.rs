use hoard_types::Key;

use crate::block::Block;
use crate::error::StoreResult;
use crate::lock::GcLocker;

/// Lazy enumeration of every key in a store.
///
/// Items are produced on demand; an `Err` item reports a failure reading the
/// underlying key space and callers should stop at the first one.
pub type KeyIter = Box<dyn Iterator<Item = StoreResult<Key>> + Send>;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written; the same bytes always land under the
///   same key.
/// - `put` is idempotent.
/// - Concurrent reads are always safe.
/// - The store never interprets block contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlockStore: Send + Sync {
    /// Read the bytes stored under `key`.
    ///
    /// Returns `Ok(None)` if the block does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>>;

    /// Write a block and return its key.
    ///
    /// If the block already exists, this is a no-op.
    fn put(&self, block: &Block) -> StoreResult<Key>;

    /// Check whether a block exists in the store.
    fn has(&self, key: &Key) -> StoreResult<bool>;

    /// Delete the block stored under `key`.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound) if
    /// the block is absent. This is intended for garbage collection only;
    /// deleting a referenced block corrupts the DAGs that link to it.
    fn delete(&self, key: &Key) -> StoreResult<()>;

    /// Begin enumerating every key currently in the store.
    ///
    /// The returned iterator is lazy. Ordering is backend-defined.
    fn all_keys(&self) -> StoreResult<KeyIter>;

    /// The lock that serializes garbage collection against writers.
    fn locker(&self) -> &GcLocker;

    /// Write multiple blocks and return their keys.
    ///
    /// Default implementation calls `put()` for each block. Backends may
    /// override for better performance (e.g., a single fsync).
    fn put_many(&self, blocks: &[Block]) -> StoreResult<Vec<Key>> {
        blocks.iter().map(|block| self.put(block)).collect()
    }
}
