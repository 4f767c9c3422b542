//! Error types for garbage collection.

use std::fmt;

use hoard_dag::DagError;
use hoard_pin::PinError;
use hoard_store::StoreError;
use hoard_types::Key;

/// The root categories that feed the live set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootCategory {
    /// Recursively pinned roots.
    Recursive,
    /// Advisory roots supplied by the caller.
    BestEffort,
    /// Directly pinned blocks.
    Direct,
    /// Blocks the pin registry depends on.
    Internal,
}

impl fmt::Display for RootCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recursive => write!(f, "recursive"),
            Self::BestEffort => write!(f, "best-effort"),
            Self::Direct => write!(f, "direct"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Errors that can end a collection pass.
#[derive(Debug, thiserror::Error)]
pub enum GcError {
    /// The pin registry could not list a root category.
    #[error("cannot read {category} pins: {source}")]
    Registry {
        category: RootCategory,
        source: PinError,
    },

    /// A pinned root or one of its descendants could not be fetched or decoded.
    #[error("cannot traverse {category} roots: {source}")]
    Traversal {
        category: RootCategory,
        source: DagError,
    },

    /// Key enumeration could not be started.
    #[error("cannot enumerate store keys: {0}")]
    Enumerate(#[source] StoreError),

    /// Key enumeration failed part way through the sweep.
    #[error("key enumeration failed mid-sweep: {0}")]
    EnumerationInterrupted(#[source] StoreError),

    /// A block could not be deleted; the sweep stopped here.
    #[error("failed to delete {key}: {source}")]
    Delete { key: Key, source: StoreError },

    /// The sweep task ended abnormally.
    #[error("sweep task aborted: {0}")]
    SweepAborted(String),
}

impl GcError {
    /// Returns `true` for errors raised before the sweep started.
    ///
    /// A setup error guarantees that nothing was deleted.
    pub fn is_setup(&self) -> bool {
        match self {
            Self::Registry { .. } | Self::Traversal { .. } | Self::Enumerate(_) => true,
            Self::EnumerationInterrupted(_) | Self::Delete { .. } | Self::SweepAborted(_) => false,
        }
    }
}

/// Convenience alias for collection results.
pub type GcResult<T> = Result<T, GcError>;
