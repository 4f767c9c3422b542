//! The garbage-collection lock.
//!
//! [`GcLocker`] is a readers-writer lock with no protected data. Collection
//! holds the exclusive side for an entire pass so that no pin, unpin or
//! pinned import can interleave with mark or sweep. Any number of such
//! writers may hold the shared side concurrently.
//!
//! Guards are owned (`'static`), so a pass can move its guard into the task
//! that performs the sweep. Releasing is tied to dropping the guard, which
//! makes a double release impossible.

use std::sync::Arc;

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

/// Readers-writer lock that serializes collection against writers.
#[derive(Debug, Default)]
pub struct GcLocker {
    lock: Arc<RwLock<()>>,
}

/// Exclusive guard held by a collection pass. Dropping it releases the lock.
#[derive(Debug)]
#[must_use = "the GC lock is released as soon as the guard is dropped"]
pub struct GcUnlocker {
    _guard: OwnedRwLockWriteGuard<()>,
}

/// Shared guard held by writers that must not race with collection.
#[derive(Debug)]
#[must_use = "the pin lock is released as soon as the guard is dropped"]
pub struct PinUnlocker {
    _guard: OwnedRwLockReadGuard<()>,
}

impl GcLocker {
    /// Create an unlocked locker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive side, waiting for every current holder.
    pub async fn gc_lock(&self) -> GcUnlocker {
        let guard = Arc::clone(&self.lock).write_owned().await;
        debug!("gc lock acquired");
        GcUnlocker { _guard: guard }
    }

    /// Acquire the exclusive side only if nobody holds the lock right now.
    pub fn try_gc_lock(&self) -> Option<GcUnlocker> {
        Arc::clone(&self.lock)
            .try_write_owned()
            .ok()
            .map(|guard| GcUnlocker { _guard: guard })
    }

    /// Acquire the shared side, waiting while a collection pass runs.
    pub async fn pin_lock(&self) -> PinUnlocker {
        let guard = Arc::clone(&self.lock).read_owned().await;
        PinUnlocker { _guard: guard }
    }

    /// Returns `true` while a collection pass holds the exclusive side.
    pub fn gc_running(&self) -> bool {
        self.lock.try_read().is_err()
    }
}

impl GcUnlocker {
    /// Release the lock now rather than at end of scope.
    pub fn unlock(self) {
        debug!("gc lock released");
    }
}
