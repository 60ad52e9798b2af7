//! Type definitions for machines and snapshot trees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// MACHINES
// =============================================================================

/// Power state reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
    Suspended,
}

/// One row of the host's machine inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineSummary {
    /// Human-readable name
    pub name: String,
    /// Current power state
    pub power: PowerState,
    /// Guest IP address, when the machine is running and reporting one
    pub ip_address: Option<String>,
}

/// Handle to a machine located by name.
///
/// The `id` is the host's own identifier for the machine and is what every
/// mutating call addresses. Handles are only valid for the command that
/// obtained them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineHandle {
    pub id: String,
    pub name: String,
}

// =============================================================================
// SNAPSHOT TREE
// =============================================================================

/// Opaque host-issued handle for one snapshot.
///
/// Distinct from the snapshot's display id: references are what mutating
/// calls target and what the current-snapshot pointer compares against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotRef(String);

impl SnapshotRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SnapshotRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One node of a machine's snapshot forest.
///
/// Nodes are read-only views of host state, fetched fresh per command. The
/// numeric `id` is unique within the tree at any instant but may be reused
/// after a deletion, so it must never be cached across mutating calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub reference: SnapshotRef,
    /// Child snapshots, in creation order as reported by the host
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    /// Build a leaf node.
    pub fn new(id: i64, name: impl Into<String>, reference: SnapshotRef) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: Utc::now(),
            reference,
            children: Vec::new(),
        }
    }

    /// Attach a child snapshot, preserving creation order.
    pub fn with_child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A machine's snapshot forest plus its current-snapshot pointer.
///
/// An empty forest with no current pointer is a machine without snapshots;
/// lookups against it report not-found rather than erroring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotTree {
    /// Root snapshots, in creation order
    pub roots: Vec<SnapshotNode>,
    /// Reference of the snapshot the machine would revert to by default
    pub current: Option<SnapshotRef>,
}

impl SnapshotTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
