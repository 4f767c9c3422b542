//! Per-pass statistics.

use std::fmt;

/// Counters gathered while building the live set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkStats {
    pub recursive_roots: usize,
    pub best_effort_roots: usize,
    pub direct_pins: usize,
    pub internal_roots: usize,
    /// Branches abandoned by the tolerant walk over best-effort roots.
    pub skipped_branches: usize,
    pub live_keys: usize,
}

/// How a sweep ended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Every stored key was examined.
    #[default]
    Completed,
    /// The cancellation token fired.
    Cancelled,
    /// The consumer dropped its end of the stream.
    Disconnected,
    /// A delete or enumeration error stopped the sweep.
    Failed(String),
}

impl fmt::Display for SweepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Counters gathered by the sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub scanned: usize,
    pub retained: usize,
    pub removed: usize,
    pub outcome: SweepOutcome,
}
