//! Depth-first traversal over snapshot forests.

use crate::types::{SnapshotNode, SnapshotTree};

/// Continuation signal returned by a traversal strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    Stop,
}

/// Maximum traversal depth. Subtrees below this are pruned, guarding
/// against malformed host data that nests absurdly or cycles.
pub const MAX_DEPTH: usize = 10;

/// Pre-order walk over the forest.
///
/// Roots and siblings are visited in stored order, each node before its
/// children. Returning [`Walk::Stop`] halts the whole traversal; no further
/// node is visited. An empty forest is a no-op.
pub fn walk<'a, F>(tree: &'a SnapshotTree, mut visit: F)
where
    F: FnMut(&'a SnapshotNode) -> Walk,
{
    let mut stack: Vec<(&SnapshotNode, usize)> = Vec::new();
    for root in tree.roots.iter().rev() {
        stack.push((root, 1));
    }

    while let Some((node, depth)) = stack.pop() {
        if visit(node) == Walk::Stop {
            return;
        }
        if depth >= MAX_DEPTH {
            continue;
        }
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }
}

/// Locate the node the machine's current-snapshot pointer refers to.
///
/// Returns `None` when the machine has no current snapshot, or when no node
/// in the tree carries the reference (a malformed host response; treated as
/// absent rather than an error). References are unique, so the walk stops at
/// the first match.
pub fn current_snapshot(tree: &SnapshotTree) -> Option<&SnapshotNode> {
    let current = tree.current.as_ref()?;
    let mut found = None;
    walk(tree, |node| {
        if node.reference == *current {
            found = Some(node);
            Walk::Stop
        } else {
            Walk::Continue
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SnapshotRef;

    fn node(id: i64, name: &str) -> SnapshotNode {
        SnapshotNode::new(id, name, SnapshotRef::new(format!("ref-{id}")))
    }

    /// roots [A(children: [B, C]), D]
    fn sample_tree() -> SnapshotTree {
        SnapshotTree {
            roots: vec![
                node(1, "A").with_child(node(2, "B")).with_child(node(3, "C")),
                node(4, "D"),
            ],
            current: None,
        }
    }

    #[test]
    fn test_preorder_visit_order() {
        let tree = sample_tree();
        let mut order = Vec::new();
        walk(&tree, |n| {
            order.push(n.name.clone());
            Walk::Continue
        });
        assert_eq!(order, ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_stop_halts_whole_traversal() {
        let tree = sample_tree();
        let mut order = Vec::new();
        walk(&tree, |n| {
            order.push(n.name.clone());
            if n.name == "B" {
                Walk::Stop
            } else {
                Walk::Continue
            }
        });
        // Neither the remaining sibling C nor the remaining root D is visited.
        assert_eq!(order, ["A", "B"]);
    }

    #[test]
    fn test_empty_forest_is_noop() {
        let tree = SnapshotTree::default();
        let mut visited = 0;
        walk(&tree, |_| {
            visited += 1;
            Walk::Continue
        });
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_depth_cap_prunes_deep_chains() {
        // A single chain twice as deep as the cap.
        let mut chain = node(100, "deepest");
        for id in (0..(MAX_DEPTH as i64 * 2)).rev() {
            chain = node(id, &format!("n{id}")).with_child(chain);
        }
        let tree = SnapshotTree {
            roots: vec![chain],
            current: None,
        };

        let mut visited = 0;
        walk(&tree, |_| {
            visited += 1;
            Walk::Continue
        });
        assert_eq!(visited, MAX_DEPTH);
    }

    #[test]
    fn test_current_snapshot_absent_pointer() {
        let tree = sample_tree();
        assert!(current_snapshot(&tree).is_none());
    }

    #[test]
    fn test_current_snapshot_nested() {
        let mut tree = sample_tree();
        tree.current = Some(SnapshotRef::new("ref-3"));
        let found = current_snapshot(&tree).expect("current should resolve");
        assert_eq!(found.id, 3);
        assert_eq!(found.name, "C");
    }

    #[test]
    fn test_current_snapshot_dangling_pointer() {
        let mut tree = sample_tree();
        tree.current = Some(SnapshotRef::new("ref-999"));
        assert!(current_snapshot(&tree).is_none());
    }
}
