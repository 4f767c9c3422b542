//! The [`Pinner`] trait.

use hoard_types::Cid;

use crate::error::PinResult;
use crate::types::PinMode;

/// Registry of pinned content.
///
/// The three listing methods are what garbage collection reads at the start
/// of a pass. Implementations must return a consistent snapshot for the
/// duration of one call; callers hold the store's GC lock to keep the
/// snapshot stable across calls.
pub trait Pinner: Send + Sync {
    /// Roots pinned recursively.
    fn recursive_keys(&self) -> PinResult<Vec<Cid>>;

    /// Cids pinned directly.
    fn direct_keys(&self) -> PinResult<Vec<Cid>>;

    /// Roots of the blocks the registry itself depends on.
    fn internal_pins(&self) -> PinResult<Vec<Cid>>;

    /// Pin `cid` with the given mode.
    ///
    /// Pinning a directly pinned cid recursively upgrades it. Pinning a
    /// recursively pinned cid directly fails with
    /// [`PinError::AlreadyPinned`](crate::PinError::AlreadyPinned).
    fn pin(&self, cid: Cid, mode: PinMode) -> PinResult<()>;

    /// Remove the pin on `cid`, returning the mode it had.
    fn unpin(&self, cid: &Cid) -> PinResult<PinMode>;

    /// How `cid` is pinned, if at all.
    fn pinned(&self, cid: &Cid) -> PinResult<Option<PinMode>>;
}
