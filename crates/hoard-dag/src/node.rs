//! Decoded DAG nodes.
//!
//! A [`Node`] is a block decoded far enough to list its outgoing [`Link`]s.
//! `raw` blocks decode into a node with no links; `dag-json` blocks carry
//! an explicit link list.

use serde::{Deserialize, Serialize};

use hoard_store::Block;
use hoard_types::{Cid, Codec};

use crate::error::{DagError, DagResult};

/// A named edge from one block to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Name of the edge within its parent (may be empty).
    pub name: String,
    /// The referenced block.
    pub cid: Cid,
    /// Cumulative size of the referenced subgraph, as recorded by the writer.
    pub size: u64,
}

impl Link {
    /// Create a new link.
    pub fn new(name: impl Into<String>, cid: Cid, size: u64) -> Self {
        Self {
            name: name.into(),
            cid,
            size,
        }
    }
}

/// A block decoded into payload plus links.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Outgoing links, in writer order.
    pub links: Vec<Link>,
    /// Opaque payload.
    pub data: Vec<u8>,
}

impl Node {
    /// Create a link-free node carrying `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            links: Vec::new(),
            data: data.into(),
        }
    }

    /// Builder-style helper appending a link.
    pub fn with_link(mut self, name: impl Into<String>, cid: Cid, size: u64) -> Self {
        self.links.push(Link::new(name, cid, size));
        self
    }

    /// Cids of every linked child, in link order.
    pub fn child_cids(&self) -> impl DoubleEndedIterator<Item = Cid> + '_ {
        self.links.iter().map(|link| link.cid)
    }

    /// Look up a link by name.
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.name == name)
    }

    /// Encode as a `dag-json` block.
    pub fn encode(&self) -> DagResult<Block> {
        let data = serde_json::to_vec(self).map_err(|e| DagError::Serialization(e.to_string()))?;
        Ok(Block::new(Codec::DagJson, data))
    }

    /// Decode block bytes according to the codec named by `cid`.
    pub fn decode(cid: &Cid, data: &[u8]) -> DagResult<Self> {
        match cid.codec() {
            Codec::Raw => Ok(Self::new(data)),
            Codec::DagJson => serde_json::from_slice(data).map_err(|e| DagError::Decode {
                cid: *cid,
                reason: e.to_string(),
            }),
        }
    }
}
