//! Closure walking: marking a root and everything below it.

use tracing::debug;

use hoard_dag::{enumerate_children, DagResult, NodeGetter, SkippedBranch};
use hoard_types::Cid;

use crate::live::LiveSet;

/// Mark every root in `roots` and every block reachable from it.
///
/// Each root's key is marked before the root is fetched, so an unreadable
/// root is still kept. Descent stops at keys already in `set`, which bounds
/// the work to one fetch per distinct node and terminates on cycles.
///
/// In strict mode the first unreadable root or descendant aborts the walk
/// with its error; keys marked so far stay in `set`. In tolerant mode
/// (`best_effort`) unreadable nodes are skipped and returned, and the walk
/// carries on with everything else.
pub fn descendants<G>(
    getter: &G,
    set: &mut LiveSet,
    roots: &[Cid],
    best_effort: bool,
) -> DagResult<Vec<SkippedBranch>>
where
    G: NodeGetter + ?Sized,
{
    let mut skipped = Vec::new();

    for root in roots {
        set.insert(root.key());

        let node = match getter.get(root) {
            Ok(node) => node,
            Err(error) if best_effort => {
                debug!(cid = %root, %error, "skipping unreadable root");
                skipped.push(SkippedBranch { cid: *root, error });
                continue;
            }
            Err(error) => return Err(error),
        };

        let branches = enumerate_children(getter, &node, |child| set.insert(child.key()), best_effort)?;
        skipped.extend(branches);
    }

    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use hoard_dag::DagError;
    use hoard_types::Key;
    use proptest::prelude::*;

    use super::*;
    use crate::testutil::{arb_edges, numbered, reachable, Edges, Graph};

    fn keys(names: &[&str]) -> HashSet<Key> {
        names.iter().map(|n| Graph::key(n)).collect()
    }

    fn marked(set: &LiveSet) -> HashSet<Key> {
        set.iter().copied().collect()
    }

    // ---- strict mode ----

    #[test]
    fn marks_root_and_descendants() {
        let mut g = Graph::default();
        g.insert("b", &[]);
        let a = g.insert("a", &["b"]);
        g.insert("c", &[]);

        let mut set = LiveSet::new();
        let skipped = descendants(&g, &mut set, &[a], false).unwrap();

        assert!(skipped.is_empty());
        assert_eq!(marked(&set), keys(&["a", "b"]));
    }

    #[test]
    fn cycle_terminates() {
        let mut g = Graph::default();
        g.insert("y", &["x"]);
        let x = g.insert("x", &["y"]);

        let mut set = LiveSet::new();
        descendants(&g, &mut set, &[x], false).unwrap();
        assert_eq!(marked(&set), keys(&["x", "y"]));
    }

    #[test]
    fn empty_roots_mark_nothing() {
        let g = Graph::default();
        let mut set = LiveSet::new();
        let skipped = descendants(&g, &mut set, &[], false).unwrap();
        assert!(skipped.is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn strict_missing_descendant_fails() {
        let mut g = Graph::default();
        let a = g.insert("a", &["gone"]);

        let mut set = LiveSet::new();
        let err = descendants(&g, &mut set, &[a], false).unwrap_err();
        assert!(matches!(err, DagError::NotFound(cid) if cid == Graph::cid("gone")));
    }

    #[test]
    fn strict_missing_root_fails_but_root_is_marked() {
        let g = Graph::default();
        let missing = Graph::cid("missing");

        let mut set = LiveSet::new();
        assert!(descendants(&g, &mut set, &[missing], false).is_err());
        assert!(set.contains(&missing.key()));
    }

    #[test]
    fn already_marked_children_are_not_revisited() {
        let mut g = Graph::default();
        g.insert("leaf", &[]);
        g.insert("shared", &["leaf"]);
        let a = g.insert("a", &["shared"]);
        let b = g.insert("b", &["shared"]);

        let mut set = LiveSet::new();
        set.insert(Graph::key("shared"));
        descendants(&g, &mut set, &[a, b], false).unwrap();

        // `shared` was pre-marked, so its subtree was never entered.
        assert!(!set.contains(&Graph::key("leaf")));
    }

    // ---- tolerant mode ----

    #[test]
    fn tolerant_skips_missing_root() {
        let mut g = Graph::default();
        g.insert("b", &[]);
        let a = g.insert("a", &["b"]);
        let missing = Graph::cid("missing");

        let mut set = LiveSet::new();
        let skipped = descendants(&g, &mut set, &[missing, a], true).unwrap();

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].cid, missing);
        assert_eq!(marked(&set), keys(&["missing", "a", "b"]));
    }

    #[test]
    fn tolerant_keeps_reachable_siblings_of_missing_branch() {
        let mut g = Graph::default();
        g.insert("d", &[]);
        g.insert("c", &["d"]);
        let a = g.insert("a", &["gone", "c"]);

        let mut set = LiveSet::new();
        let skipped = descendants(&g, &mut set, &[a], true).unwrap();

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].cid, Graph::cid("gone"));
        assert_eq!(marked(&set), keys(&["a", "gone", "c", "d"]));
    }

    // ---- properties ----

    fn arb_case() -> impl Strategy<Value = (usize, Edges, Vec<usize>)> {
        arb_edges().prop_flat_map(|(n, edges)| {
            (Just(n), Just(edges), prop::collection::vec(0..n, 0..4))
        })
    }

    proptest! {
        #[test]
        fn marks_exactly_the_reachable_closure((n, edges, roots) in arb_case()) {
            let g = Graph::numbered(n, &edges);
            let root_cids: Vec<Cid> = roots.iter().map(|&i| Graph::cid(&numbered(i))).collect();

            let mut set = LiveSet::new();
            descendants(&g, &mut set, &root_cids, false).unwrap();

            let expected: HashSet<Key> = reachable(&edges, &roots)
                .into_iter()
                .map(|i| Graph::key(&numbered(i)))
                .collect();
            prop_assert_eq!(marked(&set), expected);
        }
    }
}
