use hoard_store::{Block, BlockStore};
use hoard_types::Cid;
use tracing::debug;

use crate::error::DagResult;
use crate::node::Node;
use crate::service::DagService;

/// Store `data` as a DAG and return the root cid.
///
/// Data that fits in one chunk becomes a single `raw` block. Larger data is
/// split into `raw` leaves of at most `chunk_size` bytes, linked in order
/// from one `dag-json` parent whose payload is empty.
pub fn import_bytes<S>(dag: &DagService<S>, data: &[u8], chunk_size: usize) -> DagResult<Cid>
where
    S: BlockStore + ?Sized,
{
    let chunk_size = chunk_size.max(1);
    if data.len() <= chunk_size {
        return dag.add_raw(data);
    }

    let leaves: Vec<Block> = data.chunks(chunk_size).map(Block::raw).collect();
    dag.blocks().add_blocks(&leaves)?;

    let parent = leaves.iter().enumerate().fold(Node::default(), |parent, (index, leaf)| {
        parent.with_link(index.to_string(), leaf.cid(), leaf.len() as u64)
    });
    let root = dag.add(&parent)?;
    debug!(root = %root, leaves = parent.links.len(), bytes = data.len(), "imported chunked data");
    Ok(root)
}
