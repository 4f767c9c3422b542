//! Content-addressed block storage for Hoard.
//!
//! Every block is an immutable byte string stored under the BLAKE3 digest of
//! its contents. The store never interprets block contents; decoding links
//! is the job of `hoard-dag`.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBlockStore`] -- one file per block under a sharded directory tree
//!
//! # Locking
//!
//! Each store owns a [`GcLocker`]. Garbage collection takes the exclusive
//! side for a whole pass; writers that must not race with collection (pin
//! and unpin, imports that are about to be pinned) take the shared side.
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content-addressing guarantees this).
//! 2. `put` is idempotent.
//! 3. Deleting a missing block is an error, never a silent no-op.
//! 4. Key enumeration is lazy; backends must not materialize more than they
//!    already hold in memory.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod block;
pub mod error;
pub mod fs;
pub mod lock;
pub mod memory;
pub mod traits;

pub use block::Block;
pub use error::{StoreError, StoreResult};
pub use fs::FsBlockStore;
pub use lock::{GcLocker, GcUnlocker, PinUnlocker};
pub use memory::InMemoryBlockStore;
pub use traits::{BlockStore, KeyIter};
