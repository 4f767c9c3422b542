//! Pin registry for Hoard.
//!
//! Blocks survive garbage collection only if they are reachable from a pin.
//! This crate tracks which content is pinned and how.
//!
//! # Pin kinds
//!
//! - **Recursive** pins keep a root and everything reachable from it.
//! - **Direct** pins keep exactly one block, never its children.
//! - **Internal** pins are not requested by users. They keep alive the
//!   blocks the registry itself writes when it persists its state.
//!
//! # Modules
//!
//! - [`error`]: Error types for pin operations
//! - [`types`]: [`PinMode`]
//! - [`traits`]: The [`Pinner`] trait consumed by the collector
//! - [`memory`]: [`InMemoryPinner`], persisted as a small DAG in the block store

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{PinError, PinResult};
pub use memory::InMemoryPinner;
pub use traits::Pinner;
pub use types::PinMode;
