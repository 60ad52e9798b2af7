//! Snapshot identifier resolution.

use crate::error::{HostError, Result};
use crate::tree::{walk, Walk};
use crate::types::{SnapshotNode, SnapshotTree};

/// How a user-supplied snapshot identifier is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Exact match on the snapshot name. Names are not unique.
    Name(String),
    /// Exact match on the numeric snapshot id. Unique within a tree.
    Id(i64),
}

impl Selector {
    /// Build a selector from a raw identifier.
    ///
    /// In id mode the identifier must parse as an integer; anything else is
    /// an [`HostError::InvalidIdentifier`] raised before any traversal.
    pub fn parse(identifier: &str, by_id: bool) -> Result<Self> {
        if by_id {
            identifier
                .parse::<i64>()
                .map(Selector::Id)
                .map_err(|_| HostError::InvalidIdentifier(identifier.to_string()))
        } else {
            Ok(Selector::Name(identifier.to_string()))
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Name(name) => f.write_str(name),
            Selector::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Resolve a selector to exactly one snapshot in the tree.
///
/// Id lookups stop at the first hit: ids are unique by host contract, so the
/// first match is authoritative. Name lookups scan the whole forest so that
/// duplicate names are detected and reported as ambiguous instead of
/// silently picking one.
pub fn resolve<'a>(
    tree: &'a SnapshotTree,
    machine: &str,
    selector: &Selector,
) -> Result<&'a SnapshotNode> {
    let mut matches: Vec<&SnapshotNode> = Vec::new();
    walk(tree, |node| match selector {
        Selector::Id(id) => {
            if node.id == *id {
                matches.push(node);
                Walk::Stop
            } else {
                Walk::Continue
            }
        }
        Selector::Name(name) => {
            if node.name == *name {
                matches.push(node);
            }
            Walk::Continue
        }
    });

    match matches.len() {
        0 => Err(HostError::SnapshotNotFound {
            machine: machine.to_string(),
            identifier: selector.to_string(),
        }),
        1 => Ok(matches[0]),
        _ => Err(HostError::AmbiguousSnapshot {
            machine: machine.to_string(),
            identifier: selector.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SnapshotRef;

    fn node(id: i64, name: &str) -> SnapshotNode {
        SnapshotNode::new(id, name, SnapshotRef::new(format!("ref-{id}")))
    }

    /// roots [{id:1, name:"base", children:[{id:2, name:"mid"}]}], current = ref-2
    fn base_mid_tree() -> SnapshotTree {
        SnapshotTree {
            roots: vec![node(1, "base").with_child(node(2, "mid"))],
            current: Some(SnapshotRef::new("ref-2")),
        }
    }

    #[test]
    fn test_parse_rejects_non_numeric_id() {
        let err = Selector::parse("nightly", true).unwrap_err();
        assert!(matches!(err, HostError::InvalidIdentifier(ref s) if s == "nightly"));
    }

    #[test]
    fn test_parse_name_mode_keeps_identifier() {
        let sel = Selector::parse("nightly", false).unwrap();
        assert_eq!(sel, Selector::Name("nightly".to_string()));
    }

    #[test]
    fn test_resolve_by_id() {
        let tree = base_mid_tree();
        let found = resolve(&tree, "vm1", &Selector::Id(2)).unwrap();
        assert_eq!(found.name, "mid");
    }

    #[test]
    fn test_resolve_by_name() {
        let tree = base_mid_tree();
        let found = resolve(&tree, "vm1", &Selector::Name("base".to_string())).unwrap();
        assert_eq!(found.id, 1);
    }

    #[test]
    fn test_resolve_unknown_id_is_not_found() {
        let tree = base_mid_tree();
        let err = resolve(&tree, "vm1", &Selector::Id(42)).unwrap_err();
        assert!(matches!(
            err,
            HostError::SnapshotNotFound { ref machine, ref identifier }
                if machine == "vm1" && identifier == "42"
        ));
    }

    #[test]
    fn test_resolve_empty_tree_is_not_found() {
        let tree = SnapshotTree::default();
        let err = resolve(&tree, "vm1", &Selector::Name("base".to_string())).unwrap_err();
        assert!(matches!(err, HostError::SnapshotNotFound { .. }));
    }

    #[test]
    fn test_duplicate_names_are_ambiguous() {
        // Two snapshots both named "daily", at ids 5 and 7 in different
        // subtrees. Name resolution must scan everything and refuse to pick.
        let tree = SnapshotTree {
            roots: vec![
                node(1, "base").with_child(node(5, "daily")),
                node(7, "daily"),
            ],
            current: None,
        };

        let err = resolve(&tree, "vm1", &Selector::Name("daily".to_string())).unwrap_err();
        assert!(matches!(
            err,
            HostError::AmbiguousSnapshot { ref identifier, .. } if identifier == "daily"
        ));

        // The same snapshots stay reachable by id.
        let found = resolve(&tree, "vm1", &Selector::Id(7)).unwrap();
        assert_eq!(found.name, "daily");
    }

    #[test]
    fn test_name_resolution_scans_whole_tree() {
        // The second "daily" sits after the first in pre-order; detecting the
        // ambiguity proves the walk did not stop at the first match.
        let tree = SnapshotTree {
            roots: vec![node(5, "daily"), node(6, "other"), node(7, "daily")],
            current: None,
        };
        let err = resolve(&tree, "vm1", &Selector::Name("daily".to_string())).unwrap_err();
        assert!(matches!(err, HostError::AmbiguousSnapshot { .. }));
    }

    #[test]
    fn test_id_resolution_stops_at_first_match() {
        let tree = base_mid_tree();
        let mut visited = 0;
        crate::tree::walk(&tree, |n| {
            visited += 1;
            if n.id == 1 {
                crate::tree::Walk::Stop
            } else {
                crate::tree::Walk::Continue
            }
        });
        assert_eq!(visited, 1);

        // resolve() behaves the same way: id 1 is the first pre-order node,
        // and the match is authoritative.
        let found = resolve(&tree, "vm1", &Selector::Id(1)).unwrap();
        assert_eq!(found.name, "base");
    }
}
