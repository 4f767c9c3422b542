//! Block and node services over a local store.

use std::sync::Arc;

use tracing::debug;

use hoard_store::{Block, BlockStore};
use hoard_types::Cid;

use crate::error::{DagError, DagResult};
use crate::exchange::{Exchange, OfflineExchange};
use crate::node::Node;

/// Anything that can resolve a cid to a decoded [`Node`].
pub trait NodeGetter {
    /// Fetch and decode the node named by `cid`.
    ///
    /// Fails with [`DagError::NotFound`] if the block is unavailable and
    /// [`DagError::Decode`] if its bytes do not parse.
    fn get(&self, cid: &Cid) -> DagResult<Node>;
}

/// Block access backed by a local store with an exchange fallback.
pub struct BlockService<S: BlockStore + ?Sized> {
    store: Arc<S>,
    exchange: Arc<dyn Exchange>,
}

impl<S: BlockStore + ?Sized> BlockService<S> {
    /// Create a service that consults `exchange` on local misses.
    pub fn new(store: Arc<S>, exchange: Arc<dyn Exchange>) -> Self {
        Self { store, exchange }
    }

    /// Create a service that only ever reads the local store.
    pub fn offline(store: Arc<S>) -> Self {
        Self::new(store, Arc::new(OfflineExchange))
    }

    /// Returns `true` if misses may be served from other nodes.
    pub fn is_online(&self) -> bool {
        self.exchange.is_online()
    }

    /// Fetch a block, verifying it against its cid.
    ///
    /// Blocks obtained through the exchange are written to the local store.
    pub fn get_block(&self, cid: &Cid) -> DagResult<Block> {
        if let Some(data) = self.store.get(&cid.key())? {
            return Ok(Block::with_cid(*cid, data)?);
        }
        match self.exchange.fetch(cid)? {
            Some(block) => {
                let block = Block::with_cid(*cid, block.into_data())?;
                self.store.put(&block)?;
                debug!(cid = %cid, "block fetched through exchange");
                Ok(block)
            }
            None => Err(DagError::NotFound(*cid)),
        }
    }

    /// Write a block to the local store and return its cid.
    pub fn add_block(&self, block: &Block) -> DagResult<Cid> {
        self.store.put(block)?;
        Ok(block.cid())
    }

    /// Write a batch of blocks, returning their cids in order.
    pub fn add_blocks(&self, blocks: &[Block]) -> DagResult<Vec<Cid>> {
        self.store.put_many(blocks)?;
        Ok(blocks.iter().map(Block::cid).collect())
    }
}

/// Node-level access: encode, store, fetch and decode DAG nodes.
pub struct DagService<S: BlockStore + ?Sized> {
    blocks: BlockService<S>,
}

impl<S: BlockStore + ?Sized> DagService<S> {
    /// Wrap a block service.
    pub fn new(blocks: BlockService<S>) -> Self {
        Self { blocks }
    }

    /// Convenience constructor for a local-only DAG service.
    pub fn offline(store: Arc<S>) -> Self {
        Self::new(BlockService::offline(store))
    }

    /// The underlying block service.
    pub fn blocks(&self) -> &BlockService<S> {
        &self.blocks
    }

    /// Encode and store a node, returning its cid.
    pub fn add(&self, node: &Node) -> DagResult<Cid> {
        self.blocks.add_block(&node.encode()?)
    }

    /// Store opaque bytes as a `raw` leaf, returning its cid.
    pub fn add_raw(&self, data: impl Into<Vec<u8>>) -> DagResult<Cid> {
        self.blocks.add_block(&Block::raw(data))
    }
}

impl<S: BlockStore + ?Sized> NodeGetter for DagService<S> {
    fn get(&self, cid: &Cid) -> DagResult<Node> {
        let block = self.blocks.get_block(cid)?;
        Node::decode(cid, block.data())
    }
}
