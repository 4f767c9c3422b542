//! Filesystem block store.
//!
//! Layout under the store root:
//!
//! ```text
//! blocks/
//!   3f/
//!     3fa1...e9    <- one file per block, named by the full hex key
//!   a0/
//!     a07c...12
//! ```
//!
//! Blocks are written to a temporary file in the shard directory and then
//! atomically renamed into place, so a crash never leaves a partially
//! written block under a valid key.

use std::fs::{self, ReadDir};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use hoard_types::Key;

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::lock::GcLocker;
use crate::traits::{BlockStore, KeyIter};

/// Directory holding the block shards, relative to the store root.
const BLOCKS_DIR: &str = "blocks";

/// Number of hex characters used for the shard directory name.
const SHARD_WIDTH: usize = 2;

/// Block store keeping one file per block.
#[derive(Debug)]
pub struct FsBlockStore {
    blocks_dir: PathBuf,
    locker: GcLocker,
}

impl FsBlockStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: &Path) -> StoreResult<Self> {
        let blocks_dir = root.join(BLOCKS_DIR);
        fs::create_dir_all(&blocks_dir)?;
        debug!(path = %blocks_dir.display(), "opened filesystem block store");
        Ok(Self {
            blocks_dir,
            locker: GcLocker::new(),
        })
    }

    fn shard_dir(&self, hex: &str) -> PathBuf {
        self.blocks_dir.join(&hex[..SHARD_WIDTH])
    }

    fn block_path(&self, key: &Key) -> PathBuf {
        let hex = key.to_hex();
        self.shard_dir(&hex).join(hex)
    }
}

impl BlockStore for FsBlockStore {
    fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>> {
        let data = match fs::read(self.block_path(key)) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let computed = Key::for_data(&data);
        if computed != *key {
            return Err(StoreError::HashMismatch {
                key: *key,
                computed,
            });
        }
        Ok(Some(data))
    }

    fn put(&self, block: &Block) -> StoreResult<Key> {
        let key = block.key();
        let path = self.block_path(&key);
        if path.try_exists()? {
            return Ok(key);
        }

        let hex = key.to_hex();
        let shard = self.shard_dir(&hex);
        fs::create_dir_all(&shard)?;

        let mut tmp = NamedTempFile::new_in(&shard)?;
        tmp.write_all(block.data())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        Ok(key)
    }

    fn has(&self, key: &Key) -> StoreResult<bool> {
        Ok(self.block_path(key).try_exists()?)
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        match fs::remove_file(self.block_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(*key)),
            Err(e) => Err(e.into()),
        }
    }

    fn all_keys(&self) -> StoreResult<KeyIter> {
        let shards = fs::read_dir(&self.blocks_dir)?;
        Ok(Box::new(FsKeyIter {
            shards,
            current: None,
        }))
    }

    fn locker(&self) -> &GcLocker {
        &self.locker
    }
}

/// Lazy walk over shard directories, yielding one key per block file.
struct FsKeyIter {
    shards: ReadDir,
    current: Option<ReadDir>,
}

impl Iterator for FsKeyIter {
    type Item = StoreResult<Key>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entries) = self.current.as_mut() {
                match entries.next() {
                    Some(Ok(entry)) => match key_from_file_name(&entry.path()) {
                        Some(key) => return Some(Ok(key)),
                        // Leftover temp files and foreign files.
                        None => continue,
                    },
                    Some(Err(e)) => return Some(Err(e.into())),
                    None => self.current = None,
                }
            }

            let shard = match self.shards.next()? {
                Ok(entry) => entry.path(),
                Err(e) => return Some(Err(e.into())),
            };
            if !shard.is_dir() {
                warn!(path = %shard.display(), "ignoring stray file in block directory");
                continue;
            }
            match fs::read_dir(&shard) {
                Ok(entries) => self.current = Some(entries),
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

fn key_from_file_name(path: &Path) -> Option<Key> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| Key::from_hex(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FsBlockStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlockStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn put_and_get() {
        let (_dir, store) = temp_store();
        let key = store.put(&Block::raw(b"on disk".to_vec())).unwrap();
        assert_eq!(store.get(&key).unwrap().unwrap(), b"on disk");
        assert!(store.has(&key).unwrap());
    }

    #[test]
    fn blocks_are_sharded_by_key_prefix() {
        let (dir, store) = temp_store();
        let key = store.put(&Block::raw(b"sharded".to_vec())).unwrap();
        let hex = key.to_hex();
        let expected = dir.path().join(BLOCKS_DIR).join(&hex[..2]).join(&hex);
        assert!(expected.is_file());
    }

    #[test]
    fn get_missing_returns_none() {
        let (_dir, store) = temp_store();
        assert!(store.get(&Key::for_data(b"nope")).unwrap().is_none());
    }

    #[test]
    fn get_detects_corruption() {
        let (_dir, store) = temp_store();
        let key = store.put(&Block::raw(b"pristine".to_vec())).unwrap();
        fs::write(store.block_path(&key), b"bit rot").unwrap();
        let err = store.get(&key).unwrap_err();
        assert!(matches!(err, StoreError::HashMismatch { .. }));
    }

    #[test]
    fn delete_then_delete_again() {
        let (_dir, store) = temp_store();
        let key = store.put(&Block::raw(b"gone".to_vec())).unwrap();
        store.delete(&key).unwrap();
        assert!(!store.has(&key).unwrap());
        assert!(matches!(store.delete(&key), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn all_keys_skips_foreign_files() {
        let (dir, store) = temp_store();
        let a = store.put(&Block::raw(b"a".to_vec())).unwrap();
        let b = store.put(&Block::raw(b"b".to_vec())).unwrap();

        let shard = dir.path().join(BLOCKS_DIR).join(&a.to_hex()[..2]);
        fs::write(shard.join(".tmp-partial"), b"junk").unwrap();
        fs::write(dir.path().join(BLOCKS_DIR).join("README"), b"junk").unwrap();

        let mut keys: Vec<Key> = store.all_keys().unwrap().map(|k| k.unwrap()).collect();
        keys.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn reopen_sees_existing_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let key = {
            let store = FsBlockStore::open(dir.path()).unwrap();
            store.put(&Block::raw(b"durable".to_vec())).unwrap()
        };
        let store = FsBlockStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&key).unwrap().unwrap(), b"durable");
    }

    #[test]
    fn empty_store_enumerates_nothing() {
        let (_dir, store) = temp_store();
        assert_eq!(store.all_keys().unwrap().count(), 0);
    }
}
