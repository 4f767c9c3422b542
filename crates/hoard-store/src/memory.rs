use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use hoard_types::Key;

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::lock::GcLocker;
use crate::traits::{BlockStore, KeyIter};

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held behind a `RwLock` and
/// cloned on read. Key enumeration snapshots the current key set, so a
/// sweep never holds the map lock while deleting.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Key, Vec<u8>>>,
    locker: GcLocker,
}

impl InMemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            locker: GcLocker::new(),
        }
    }

    fn read_map(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<Key, Vec<u8>>>> {
        self.blocks.read().map_err(|_| StoreError::Poisoned)
    }

    fn write_map(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<Key, Vec<u8>>>> {
        self.blocks.write().map_err(|_| StoreError::Poisoned)
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.read_map().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> StoreResult<Vec<Key>> {
        let mut keys: Vec<Key> = self.read_map()?.keys().copied().collect();
        keys.sort();
        Ok(keys)
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn put(&self, block: &Block) -> StoreResult<Key> {
        let key = block.key();
        self.write_map()?
            .entry(key)
            .or_insert_with(|| block.data().to_vec());
        Ok(key)
    }

    fn has(&self, key: &Key) -> StoreResult<bool> {
        Ok(self.read_map()?.contains_key(key))
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        match self.write_map()?.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(*key)),
        }
    }

    fn all_keys(&self) -> StoreResult<KeyIter> {
        let keys: Vec<Key> = self.read_map()?.keys().copied().collect();
        Ok(Box::new(keys.into_iter().map(Ok)))
    }

    fn locker(&self) -> &GcLocker {
        &self.locker
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &self.len())
            .finish()
    }
}
