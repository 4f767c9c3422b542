//! Merkle-DAG layer for Hoard.
//!
//! Blocks in a Hoard store form directed graphs: a `dag-json` block decodes
//! into a [`Node`] whose [`Link`]s name other blocks by [`Cid`]. This crate
//! decodes nodes, fetches them through a [`BlockService`], and walks their
//! links.
//!
//! # Fetching
//!
//! [`BlockService`] reads from the local [`BlockStore`] first and falls back
//! to an [`Exchange`] on a miss. Only [`OfflineExchange`] ships with this
//! crate; it never leaves the local node, which is what garbage collection
//! requires.
//!
//! # Traversal
//!
//! [`enumerate_children`] walks everything reachable from a node with an
//! explicit stack. A visitor decides whether each discovered link is
//! descended into, which lets callers stop at already-seen blocks. The graph
//! is not assumed to be acyclic.
//!
//! [`Cid`]: hoard_types::Cid
//! [`BlockStore`]: hoard_store::BlockStore

pub mod error;
pub mod exchange;
pub mod import;
pub mod node;
pub mod service;
pub mod walk;

pub use error::{DagError, DagResult};
pub use exchange::{Exchange, OfflineExchange};
pub use import::import_bytes;
pub use node::{Link, Node};
pub use service::{BlockService, DagService, NodeGetter};
pub use walk::{enumerate_children, SkippedBranch};
