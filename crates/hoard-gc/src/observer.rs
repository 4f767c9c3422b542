//! Progress reporting for collection passes.

use tracing::{debug, info, warn};

use hoard_types::{Cid, Key};

use crate::stats::{MarkStats, SweepOutcome, SweepStats};

/// Something that happened during a pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GcEvent {
    /// The GC lock is held and marking is about to begin.
    MarkStarted { best_effort_roots: usize },
    /// A best-effort branch could not be read and was left unmarked below
    /// its root.
    BranchSkipped { cid: Cid, reason: String },
    /// The live set is complete.
    MarkFinished(MarkStats),
    /// A block was deleted.
    Removed { key: Key },
    /// The sweep stopped and the GC lock has been released.
    SweepFinished(SweepStats),
}

/// Receives [`GcEvent`]s from a running pass.
///
/// Called synchronously from the mark and sweep loops; implementations
/// should return quickly.
pub trait GcObserver: Send + Sync {
    fn emit(&self, event: &GcEvent);
}

/// Reports events through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl GcObserver for TracingObserver {
    fn emit(&self, event: &GcEvent) {
        match event {
            GcEvent::MarkStarted { best_effort_roots } => {
                debug!(best_effort_roots = *best_effort_roots, "mark phase started");
            }
            GcEvent::BranchSkipped { cid, reason } => {
                warn!(cid = %cid, reason = %reason, "best-effort branch skipped");
            }
            GcEvent::MarkFinished(stats) => {
                info!(
                    recursive = stats.recursive_roots,
                    best_effort = stats.best_effort_roots,
                    direct = stats.direct_pins,
                    internal = stats.internal_roots,
                    skipped = stats.skipped_branches,
                    live = stats.live_keys,
                    "mark phase finished"
                );
            }
            GcEvent::Removed { key } => {
                debug!(key = %key, "removed block");
            }
            GcEvent::SweepFinished(stats) => match &stats.outcome {
                SweepOutcome::Failed(reason) => warn!(
                    scanned = stats.scanned,
                    removed = stats.removed,
                    reason = %reason,
                    "sweep failed"
                ),
                outcome => info!(
                    scanned = stats.scanned,
                    retained = stats.retained,
                    removed = stats.removed,
                    outcome = %outcome,
                    "sweep finished"
                ),
            },
        }
    }
}
