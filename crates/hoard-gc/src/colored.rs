//! Live-set construction.

use hoard_dag::NodeGetter;
use hoard_pin::Pinner;
use hoard_types::Cid;

use crate::error::{GcError, GcResult, RootCategory};
use crate::live::LiveSet;
use crate::observer::{GcEvent, GcObserver};
use crate::stats::MarkStats;
use crate::walker::descendants;

/// Build the set of keys that must survive a collection pass.
///
/// The categories are processed in a fixed order:
///
/// 1. recursive pins, strict;
/// 2. `best_effort_roots`, tolerant;
/// 3. direct pins, marked without descent;
/// 4. internal pins, strict.
///
/// Direct pins are read in that order but merged after the internal walk.
/// The walks stop at keys already in the set, so merging them earlier would
/// hide the children of a direct pin that an internal root also reaches.
///
/// Any registry or strict traversal failure aborts the build. Nothing has
/// been deleted at that point, so the caller can simply report it.
pub fn colored_set<P, G>(
    pinner: &P,
    getter: &G,
    best_effort_roots: &[Cid],
    observer: &dyn GcObserver,
) -> GcResult<(LiveSet, MarkStats)>
where
    P: Pinner + ?Sized,
    G: NodeGetter + ?Sized,
{
    let mut live = LiveSet::new();
    let mut stats = MarkStats::default();

    let recursive = pinner.recursive_keys().map_err(|source| GcError::Registry {
        category: RootCategory::Recursive,
        source,
    })?;
    stats.recursive_roots = recursive.len();
    descendants(getter, &mut live, &recursive, false).map_err(|source| GcError::Traversal {
        category: RootCategory::Recursive,
        source,
    })?;

    stats.best_effort_roots = best_effort_roots.len();
    let skipped = descendants(getter, &mut live, best_effort_roots, true).map_err(|source| {
        GcError::Traversal {
            category: RootCategory::BestEffort,
            source,
        }
    })?;
    stats.skipped_branches = skipped.len();
    for branch in skipped {
        observer.emit(&GcEvent::BranchSkipped {
            cid: branch.cid,
            reason: branch.error.to_string(),
        });
    }

    let direct = pinner.direct_keys().map_err(|source| GcError::Registry {
        category: RootCategory::Direct,
        source,
    })?;
    stats.direct_pins = direct.len();

    let internal = pinner.internal_pins().map_err(|source| GcError::Registry {
        category: RootCategory::Internal,
        source,
    })?;
    stats.internal_roots = internal.len();
    descendants(getter, &mut live, &internal, false).map_err(|source| GcError::Traversal {
        category: RootCategory::Internal,
        source,
    })?;

    live.extend(direct.iter().map(Cid::key));

    stats.live_keys = live.len();
    observer.emit(&GcEvent::MarkFinished(stats.clone()));
    Ok((live, stats))
}
