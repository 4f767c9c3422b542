//! Link traversal.

use tracing::debug;

use hoard_types::Cid;

use crate::error::{DagError, DagResult};
use crate::node::Node;
use crate::service::NodeGetter;

/// A branch abandoned during a best-effort walk.
#[derive(Debug)]
pub struct SkippedBranch {
    /// The node that could not be fetched or decoded.
    pub cid: Cid,
    /// Why it was skipped.
    pub error: DagError,
}

/// Walk every block reachable from `root`'s links.
///
/// `visit` is called once per discovered link. Returning `true` descends
/// into the linked node; returning `false` prunes that branch. Callers use
/// this to stop at nodes they have already seen, which is also what makes
/// the walk terminate on cyclic graphs.
///
/// When a linked node cannot be fetched or decoded:
/// - with `best_effort` unset, the error is returned immediately;
/// - with `best_effort` set, the branch is abandoned, recorded in the
///   returned list, and the walk continues with the remaining links.
///
/// The walk uses an explicit stack, so depth is bounded by memory rather
/// than by the call stack.
pub fn enumerate_children<G, F>(
    getter: &G,
    root: &Node,
    mut visit: F,
    best_effort: bool,
) -> DagResult<Vec<SkippedBranch>>
where
    G: NodeGetter + ?Sized,
    F: FnMut(&Cid) -> bool,
{
    let mut skipped = Vec::new();
    let mut stack: Vec<Cid> = root.child_cids().filter(|cid| visit(cid)).collect();

    while let Some(cid) = stack.pop() {
        let node = match getter.get(&cid) {
            Ok(node) => node,
            Err(error) if best_effort => {
                debug!(cid = %cid, %error, "skipping unreadable branch");
                skipped.push(SkippedBranch { cid, error });
                continue;
            }
            Err(error) => return Err(error),
        };
        stack.extend(node.child_cids().filter(|child| visit(child)));
    }

    Ok(skipped)
}
