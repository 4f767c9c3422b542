//! Collector tuning.

use serde::{Deserialize, Serialize};

/// Tuning knobs for a collection pass.
///
/// Read from the `[gc]` table of a repository's `config.toml`; missing
/// fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcConfig {
    /// Number of removed keys buffered between the sweep and the consumer.
    ///
    /// A value of 1 keeps deletion in lock-step with consumption: the sweep
    /// runs at most one key ahead of the reader. Zero is treated as 1.
    pub output_capacity: usize,

    /// The sweep yields to the runtime after this many consecutive retained
    /// keys, so long runs of live blocks do not starve other tasks.
    pub yield_interval: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            output_capacity: 1,
            yield_interval: 1024,
        }
    }
}

impl GcConfig {
    pub(crate) fn channel_capacity(&self) -> usize {
        self.output_capacity.max(1)
    }

    pub(crate) fn yield_every(&self) -> usize {
        self.yield_interval.max(1)
    }
}
