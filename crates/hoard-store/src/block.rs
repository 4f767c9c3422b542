use hoard_types::{Cid, Codec, Key};

use crate::error::{StoreError, StoreResult};

/// An immutable block: bytes plus the cid they hash to.
///
/// A `Block` can only be built from data whose hash matches its cid, so
/// every value of this type is self-verifying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    cid: Cid,
    data: Vec<u8>,
}

impl Block {
    /// Create a block, computing its cid from `codec` and `data`.
    pub fn new(codec: Codec, data: Vec<u8>) -> Self {
        let cid = Cid::for_data(codec, &data);
        Self { cid, data }
    }

    /// Create a raw (link-free) block.
    pub fn raw(data: impl Into<Vec<u8>>) -> Self {
        Self::new(Codec::Raw, data.into())
    }

    /// Pair fetched bytes with the cid they were requested under.
    ///
    /// Fails with [`StoreError::HashMismatch`] if the bytes do not hash to
    /// the cid's key.
    pub fn with_cid(cid: Cid, data: Vec<u8>) -> StoreResult<Self> {
        let computed = Key::for_data(&data);
        if computed != cid.key() {
            return Err(StoreError::HashMismatch {
                key: cid.key(),
                computed,
            });
        }
        Ok(Self { cid, data })
    }

    /// The content identifier of this block.
    pub fn cid(&self) -> Cid {
        self.cid
    }

    /// The storage key of this block.
    pub fn key(&self) -> Key {
        self.cid.key()
    }

    /// The block's bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the block and return its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Size of the block in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the block carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
