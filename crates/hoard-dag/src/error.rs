//! Error types for the DAG layer.

use hoard_store::StoreError;
use hoard_types::Cid;

/// Errors that can occur while fetching or decoding nodes.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// The block is neither in the local store nor available from the exchange.
    #[error("block not found: {0}")]
    NotFound(Cid),

    /// The block's bytes could not be decoded with its codec.
    #[error("cannot decode {cid}: {reason}")]
    Decode {
        /// The block that failed to decode.
        cid: Cid,
        /// Decoder message.
        reason: String,
    },

    /// Node serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Underlying block store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
