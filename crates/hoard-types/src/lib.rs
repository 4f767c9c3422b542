//! Foundation types for Hoard.
//!
//! Every block in a Hoard store is immutable and addressed by the hash of its
//! bytes. This crate defines the identifiers shared by every other crate.
//!
//! # Key Types
//!
//! - [`Key`]: 32-byte BLAKE3 digest of a block's bytes; the store's primary key
//! - [`Cid`]: content identifier: a [`Key`] plus the [`Codec`] needed to decode it
//! - [`Codec`]: how a block's bytes are interpreted (raw leaf or linked node)

pub mod cid;
pub mod error;
pub mod key;

pub use cid::{Cid, Codec};
pub use error::TypeError;
pub use key::Key;
