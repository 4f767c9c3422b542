//! In-memory pin registry with DAG persistence.
//!
//! [`InMemoryPinner`] keeps its pin sets in memory. [`InMemoryPinner::flush`]
//! writes them into the block store as three `dag-json` nodes:
//!
//! ```text
//! root ──"recursive"──▶ set node (payload: JSON list of cids)
//!      └─"direct"─────▶ set node (payload: JSON list of cids)
//! ```
//!
//! The pinned cids live in the set nodes' payloads, not in their links, so
//! walking the internal pin never reaches pinned content. The root becomes
//! the registry's only internal pin.

use std::collections::BTreeSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use hoard_dag::{DagService, Node, NodeGetter};
use hoard_store::BlockStore;
use hoard_types::Cid;

use crate::error::{PinError, PinResult};
use crate::traits::Pinner;
use crate::types::PinMode;

const RECURSIVE_LINK: &str = "recursive";
const DIRECT_LINK: &str = "direct";

#[derive(Debug, Default)]
struct PinState {
    recursive: BTreeSet<Cid>,
    direct: BTreeSet<Cid>,
    internal: Vec<Cid>,
}

/// An in-memory implementation of [`Pinner`].
#[derive(Debug, Default)]
pub struct InMemoryPinner {
    state: RwLock<PinState>,
}

impl InMemoryPinner {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PinResult<RwLockReadGuard<'_, PinState>> {
        self.state.read().map_err(|_| PinError::Poisoned)
    }

    fn write(&self) -> PinResult<RwLockWriteGuard<'_, PinState>> {
        self.state.write().map_err(|_| PinError::Poisoned)
    }

    /// Persist the pin sets to `dag` and return the new root.
    ///
    /// The root replaces any previous internal pin, so pin-set nodes written
    /// by earlier flushes become collectable.
    pub fn flush<S>(&self, dag: &DagService<S>) -> PinResult<Cid>
    where
        S: BlockStore + ?Sized,
    {
        let mut state = self.write()?;
        let recursive = encode_set(&state.recursive)?;
        let direct = encode_set(&state.direct)?;

        let recursive_size = recursive.data.len() as u64;
        let direct_size = direct.data.len() as u64;
        let recursive_cid = dag.add(&recursive)?;
        let direct_cid = dag.add(&direct)?;

        let root = Node::default()
            .with_link(RECURSIVE_LINK, recursive_cid, recursive_size)
            .with_link(DIRECT_LINK, direct_cid, direct_size);
        let root_cid = dag.add(&root)?;
        state.internal = vec![root_cid];

        info!(
            root = %root_cid,
            recursive = state.recursive.len(),
            direct = state.direct.len(),
            "pin sets flushed"
        );
        Ok(root_cid)
    }

    /// Restore a registry from a root written by [`flush`](Self::flush).
    pub fn load<G>(getter: &G, root: &Cid) -> PinResult<Self>
    where
        G: NodeGetter + ?Sized,
    {
        let root_node = getter.get(root)?;
        let recursive = decode_set(getter, root, &root_node, RECURSIVE_LINK)?;
        let direct = decode_set(getter, root, &root_node, DIRECT_LINK)?;
        debug!(root = %root, recursive = recursive.len(), direct = direct.len(), "pin sets loaded");

        Ok(Self {
            state: RwLock::new(PinState {
                recursive,
                direct,
                internal: vec![*root],
            }),
        })
    }
}

fn encode_set(set: &BTreeSet<Cid>) -> PinResult<Node> {
    let data = serde_json::to_vec(set).map_err(|e| PinError::Serialization(e.to_string()))?;
    Ok(Node::new(data))
}

fn decode_set<G>(getter: &G, root: &Cid, root_node: &Node, name: &str) -> PinResult<BTreeSet<Cid>>
where
    G: NodeGetter + ?Sized,
{
    let link = root_node.link(name).ok_or_else(|| PinError::MalformedPinSet {
        cid: *root,
        reason: format!("missing '{name}' link"),
    })?;
    let node = getter.get(&link.cid)?;
    serde_json::from_slice(&node.data).map_err(|e| PinError::MalformedPinSet {
        cid: link.cid,
        reason: e.to_string(),
    })
}

impl Pinner for InMemoryPinner {
    fn recursive_keys(&self) -> PinResult<Vec<Cid>> {
        Ok(self.read()?.recursive.iter().copied().collect())
    }

    fn direct_keys(&self) -> PinResult<Vec<Cid>> {
        Ok(self.read()?.direct.iter().copied().collect())
    }

    fn internal_pins(&self) -> PinResult<Vec<Cid>> {
        Ok(self.read()?.internal.clone())
    }

    fn pin(&self, cid: Cid, mode: PinMode) -> PinResult<()> {
        let mut state = self.write()?;
        match mode {
            PinMode::Recursive => {
                state.direct.remove(&cid);
                state.recursive.insert(cid);
            }
            PinMode::Direct => {
                if state.recursive.contains(&cid) {
                    return Err(PinError::AlreadyPinned {
                        cid,
                        mode: PinMode::Recursive,
                    });
                }
                state.direct.insert(cid);
            }
        }
        debug!(cid = %cid, %mode, "pinned");
        Ok(())
    }

    fn unpin(&self, cid: &Cid) -> PinResult<PinMode> {
        let mut state = self.write()?;
        let mode = if state.recursive.remove(cid) {
            PinMode::Recursive
        } else if state.direct.remove(cid) {
            PinMode::Direct
        } else {
            return Err(PinError::NotPinned(*cid));
        };
        debug!(cid = %cid, %mode, "unpinned");
        Ok(mode)
    }

    fn pinned(&self, cid: &Cid) -> PinResult<Option<PinMode>> {
        let state = self.read()?;
        Ok(if state.recursive.contains(cid) {
            Some(PinMode::Recursive)
        } else if state.direct.contains(cid) {
            Some(PinMode::Direct)
        } else {
            None
        })
    }
}
