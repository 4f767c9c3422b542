//! Mark-and-sweep garbage collection for Hoard block stores.
//!
//! A pass removes every block that is not reachable from a pin. It runs in
//! two phases under the store's exclusive GC lock:
//!
//! 1. **Mark**: [`colored_set`] builds the [`LiveSet`] from four root
//!    categories: recursive pins and their descendants, caller-supplied
//!    best-effort roots and their descendants, direct pins (no descent), and
//!    the registry's internal pins and their descendants. The walk is done
//!    by [`descendants`], strict for pinned roots and tolerant for
//!    best-effort roots.
//! 2. **Sweep**: a spawned task enumerates every stored key, deletes those
//!    absent from the live set, and streams each deleted key back through a
//!    [`GcStream`].
//!
//! Mark-phase failures are returned by [`Collector::collect`] before any
//! block is deleted. Sweep-phase failures arrive as the last item of the
//! stream. Cancellation closes the stream without an error. The GC lock is
//! released on every exit path, always before the stream closes.
//!
//! Blocks are only ever read from the local store; collection never consults
//! a network exchange.

pub mod colored;
pub mod collector;
pub mod config;
pub mod error;
pub mod live;
pub mod observer;
pub mod stats;
pub mod walker;

#[cfg(test)]
mod testutil;

pub use colored::colored_set;
pub use collector::{Collector, GcStream};
pub use config::GcConfig;
pub use error::{GcError, GcResult, RootCategory};
pub use live::LiveSet;
pub use observer::{GcEvent, GcObserver, TracingObserver};
pub use stats::{MarkStats, SweepOutcome, SweepStats};
pub use walker::descendants;

pub use tokio_util::sync::CancellationToken;
