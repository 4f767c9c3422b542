//! Shared test doubles.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use hoard_dag::{DagError, DagResult, Node, NodeGetter};
use hoard_pin::{PinError, PinMode, PinResult, Pinner};
use hoard_store::{Block, BlockStore, GcLocker, InMemoryBlockStore, KeyIter, StoreError, StoreResult};
use hoard_types::{Cid, Codec, Key};
use proptest::prelude::*;

use crate::observer::{GcEvent, GcObserver};

/// A node graph keyed by synthetic cids. Unlike a real store it can hold
/// cycles; names absent from the graph are missing blocks.
#[derive(Default)]
pub struct Graph {
    nodes: HashMap<Cid, Node>,
}

impl Graph {
    pub fn cid(name: &str) -> Cid {
        Cid::for_data(Codec::DagJson, name.as_bytes())
    }

    pub fn key(name: &str) -> Key {
        Self::cid(name).key()
    }

    pub fn insert(&mut self, name: &str, children: &[&str]) -> Cid {
        let mut node = Node::new(name.as_bytes().to_vec());
        for child in children {
            node = node.with_link(*child, Self::cid(child), 0);
        }
        let cid = Self::cid(name);
        self.nodes.insert(cid, node);
        cid
    }
}

/// Adjacency list over numbered nodes.
pub type Edges = BTreeMap<usize, BTreeSet<usize>>;

/// Name of node `i` in a numbered graph.
pub fn numbered(i: usize) -> String {
    format!("n{i}")
}

impl Graph {
    /// Nodes `n0..n{count}` wired by `edges`. Cycles and self-links allowed.
    pub fn numbered(count: usize, edges: &Edges) -> Self {
        let names: Vec<String> = (0..count).map(numbered).collect();
        let mut graph = Self::default();
        for (i, name) in names.iter().enumerate() {
            let children: Vec<&str> = edges
                .get(&i)
                .into_iter()
                .flatten()
                .map(|&j| names[j].as_str())
                .collect();
            graph.insert(name, &children);
        }
        graph
    }
}

/// Breadth-first closure of `roots`, roots included.
pub fn reachable(edges: &Edges, roots: &[usize]) -> HashSet<usize> {
    let mut seen: HashSet<usize> = roots.iter().copied().collect();
    let mut queue: VecDeque<usize> = roots.iter().copied().collect();
    while let Some(n) = queue.pop_front() {
        for &m in edges.get(&n).into_iter().flatten() {
            if seen.insert(m) {
                queue.push_back(m);
            }
        }
    }
    seen
}

/// A node count with random edges between those nodes.
pub fn arb_edges() -> impl Strategy<Value = (usize, Edges)> {
    (1usize..24).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..n * 3).prop_map(move |pairs| {
            let mut edges = Edges::new();
            for (from, to) in pairs {
                edges.entry(from).or_default().insert(to);
            }
            (n, edges)
        })
    })
}

impl NodeGetter for Graph {
    fn get(&self, cid: &Cid) -> DagResult<Node> {
        self.nodes.get(cid).cloned().ok_or(DagError::NotFound(*cid))
    }
}

/// Pinner with fixed contents that can be told to fail a listing.
#[derive(Default)]
pub struct StaticPinner {
    pub recursive: Vec<Cid>,
    pub direct: Vec<Cid>,
    pub internal: Vec<Cid>,
    pub fail_direct: bool,
}

impl Pinner for StaticPinner {
    fn recursive_keys(&self) -> PinResult<Vec<Cid>> {
        Ok(self.recursive.clone())
    }

    fn direct_keys(&self) -> PinResult<Vec<Cid>> {
        if self.fail_direct {
            return Err(PinError::Poisoned);
        }
        Ok(self.direct.clone())
    }

    fn internal_pins(&self) -> PinResult<Vec<Cid>> {
        Ok(self.internal.clone())
    }

    fn pin(&self, cid: Cid, _mode: PinMode) -> PinResult<()> {
        Err(PinError::NotPinned(cid))
    }

    fn unpin(&self, cid: &Cid) -> PinResult<PinMode> {
        Err(PinError::NotPinned(*cid))
    }

    fn pinned(&self, _cid: &Cid) -> PinResult<Option<PinMode>> {
        Ok(None)
    }
}

/// Collects every event it sees.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<GcEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<GcEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl GcObserver for RecordingObserver {
    fn emit(&self, event: &GcEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// In-memory store whose deletes or enumeration can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryBlockStore,
    pub failing_deletes: HashSet<Key>,
    pub fail_enumeration: bool,
    /// Yield this many keys, then an error.
    pub enumeration_error_after: Option<usize>,
}

impl BlockStore for FlakyStore {
    fn get(&self, key: &Key) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, block: &Block) -> StoreResult<Key> {
        self.inner.put(block)
    }

    fn has(&self, key: &Key) -> StoreResult<bool> {
        self.inner.has(key)
    }

    fn delete(&self, key: &Key) -> StoreResult<()> {
        if self.failing_deletes.contains(key) {
            return Err(StoreError::Io(std::io::Error::other("disk on fire")));
        }
        self.inner.delete(key)
    }

    fn all_keys(&self) -> StoreResult<KeyIter> {
        if self.fail_enumeration {
            return Err(StoreError::Io(std::io::Error::other("index unreadable")));
        }
        let keys = self.inner.all_keys()?;
        match self.enumeration_error_after {
            Some(n) => {
                let failure = std::iter::once(Err(StoreError::Io(std::io::Error::other(
                    "index truncated",
                ))));
                Ok(Box::new(keys.take(n).chain(failure)))
            }
            None => Ok(keys),
        }
    }

    fn locker(&self) -> &GcLocker {
        self.inner.locker()
    }
}
