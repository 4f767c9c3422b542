//! Error types for pin operations.

use hoard_dag::DagError;
use hoard_types::Cid;
use thiserror::Error;

use crate::types::PinMode;

/// Errors that can occur during pin operations.
#[derive(Debug, Error)]
pub enum PinError {
    /// The cid is not pinned.
    #[error("not pinned: {0}")]
    NotPinned(Cid),

    /// The requested pin is weaker than an existing one.
    #[error("{cid} is already pinned {mode}")]
    AlreadyPinned { cid: Cid, mode: PinMode },

    /// A persisted pin-set node is missing a field or does not parse.
    #[error("malformed pin set {cid}: {reason}")]
    MalformedPinSet { cid: Cid, reason: String },

    /// Serialization failure while persisting pin state.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The registry lock was poisoned by a panicking writer.
    #[error("pin registry lock poisoned")]
    Poisoned,

    /// Failure reading or writing pin-set nodes.
    #[error("dag error: {0}")]
    Dag(#[from] DagError),
}

/// Convenience type alias for pin operations.
pub type PinResult<T> = std::result::Result<T, PinError>;
