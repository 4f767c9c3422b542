use hoard_store::Block;
use hoard_types::Cid;

use crate::error::DagResult;

/// Source of blocks that are missing from the local store.
pub trait Exchange: Send + Sync {
    /// Try to obtain a block from outside the local store.
    ///
    /// Returns `Ok(None)` when the block is unavailable.
    fn fetch(&self, cid: &Cid) -> DagResult<Option<Block>>;

    /// Returns `true` if this exchange may reach other nodes.
    fn is_online(&self) -> bool;
}

/// Exchange that never leaves the local node.
///
/// Every fetch reports the block as unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineExchange;

impl Exchange for OfflineExchange {
    fn fetch(&self, _cid: &Cid) -> DagResult<Option<Block>> {
        Ok(None)
    }

    fn is_online(&self) -> bool {
        false
    }
}
