use hoard_types::Key;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block is not in the store.
    #[error("block not found: {0}")]
    NotFound(Key),

    /// Stored bytes no longer hash to their key (data corruption).
    #[error("hash mismatch for {key}: content hashes to {computed}")]
    HashMismatch { key: Key, computed: Key },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
