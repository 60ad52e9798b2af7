//! Mock host backend for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::{debug, info};

use crate::error::{HostError, Result};
use crate::session::HostSession;
use crate::task::{OperationRequest, TaskHandle, TaskOutcome};
use crate::types::{
    MachineHandle, MachineSummary, PowerState, SnapshotNode, SnapshotRef, SnapshotTree,
};

/// Mock host backend.
///
/// Simulates a virtualization host in memory: machines with power state and
/// a mutable snapshot forest each, and a task ledger that resolves
/// operations immediately. Used by `--dev` mode and by tests.
pub struct MockHost {
    machines: RwLock<HashMap<String, MockMachine>>,
    tasks: RwLock<HashMap<String, TaskOutcome>>,
    next_machine: AtomicU64,
    next_task: AtomicU64,
    fail_next: RwLock<Option<String>>,
}

struct MockMachine {
    name: String,
    power: PowerState,
    ip_address: Option<String>,
    tree: SnapshotTree,
    next_snapshot_id: i64,
}

impl MockHost {
    /// Create a new mock host with an empty inventory.
    pub fn new() -> Self {
        info!("Creating mock host backend");
        Self {
            machines: RwLock::new(HashMap::new()),
            tasks: RwLock::new(HashMap::new()),
            next_machine: AtomicU64::new(1),
            next_task: AtomicU64::new(1),
            fail_next: RwLock::new(None),
        }
    }

    /// Add a machine to the inventory, powered off and without snapshots.
    pub fn add_machine(&self, name: impl Into<String>) -> MachineHandle {
        let name = name.into();
        let seq = self.next_machine.fetch_add(1, Ordering::SeqCst);
        let id = format!("mock-vm-{seq}");

        let mut machines = self.machines.write().expect("machine table poisoned");
        machines.insert(
            id.clone(),
            MockMachine {
                name: name.clone(),
                power: PowerState::Off,
                ip_address: Some(format!("192.0.2.{seq}")),
                tree: SnapshotTree::default(),
                next_snapshot_id: 1,
            },
        );

        debug!(machine = %name, id = %id, "Mock machine added");
        MachineHandle { id, name }
    }

    /// Make the next submitted task finish in a failed state with `reason`.
    pub fn fail_next_task(&self, reason: impl Into<String>) {
        *self.fail_next.write().expect("fail flag poisoned") = Some(reason.into());
    }

    fn record_task(&self, outcome: TaskOutcome) -> Result<TaskHandle> {
        let seq = self.next_task.fetch_add(1, Ordering::SeqCst);
        let handle = TaskHandle::new(format!("task-{seq}"));
        let mut tasks = self
            .tasks
            .write()
            .map_err(|_| HostError::Internal("Lock poisoned".to_string()))?;
        tasks.insert(handle.as_str().to_string(), outcome);
        Ok(handle)
    }

    /// Apply a request against the in-memory state, producing the terminal
    /// outcome the task will report.
    fn apply(&self, request: OperationRequest) -> Result<TaskOutcome> {
        let mut machines = self
            .machines
            .write()
            .map_err(|_| HostError::Internal("Lock poisoned".to_string()))?;

        let machine_id = match &request {
            OperationRequest::PowerOn { machine }
            | OperationRequest::PowerOff { machine }
            | OperationRequest::Reset { machine }
            | OperationRequest::CreateSnapshot { machine, .. }
            | OperationRequest::RemoveSnapshot { machine, .. }
            | OperationRequest::RevertSnapshot { machine, .. } => machine.clone(),
        };

        let Some(vm) = machines.get_mut(&machine_id) else {
            return Ok(TaskOutcome::Failed {
                reason: format!("no such machine '{machine_id}'"),
            });
        };

        let outcome = match request {
            OperationRequest::PowerOn { .. } => {
                vm.power = PowerState::On;
                TaskOutcome::Succeeded
            }
            OperationRequest::PowerOff { .. } => {
                vm.power = PowerState::Off;
                TaskOutcome::Succeeded
            }
            OperationRequest::Reset { .. } => {
                if vm.power == PowerState::On {
                    TaskOutcome::Succeeded
                } else {
                    TaskOutcome::Failed {
                        reason: "machine is not powered on".to_string(),
                    }
                }
            }
            OperationRequest::CreateSnapshot { name, .. } => {
                let id = vm.next_snapshot_id;
                vm.next_snapshot_id += 1;
                let reference = SnapshotRef::new(format!("snap-{}", uuid::Uuid::new_v4()));
                let node = SnapshotNode::new(id, name, reference.clone());

                // New snapshots hang off the current one; the current
                // pointer follows.
                let placed = match vm.tree.current.clone() {
                    Some(parent) => insert_under(&mut vm.tree.roots, &parent, node.clone()),
                    None => false,
                };
                if !placed {
                    vm.tree.roots.push(node);
                }
                vm.tree.current = Some(reference);
                TaskOutcome::Succeeded
            }
            OperationRequest::RemoveSnapshot {
                reference,
                with_children,
                ..
            } => match remove_from(&mut vm.tree.roots, None, &reference, with_children) {
                Some((removed, parent)) => {
                    let current_gone = match &vm.tree.current {
                        Some(current) if with_children => subtree_contains(&removed, current),
                        Some(current) => *current == removed.reference,
                        None => false,
                    };
                    if current_gone {
                        vm.tree.current = parent;
                    }
                    TaskOutcome::Succeeded
                }
                None => TaskOutcome::Failed {
                    reason: format!("no such snapshot '{reference}'"),
                },
            },
            OperationRequest::RevertSnapshot { reference, .. } => {
                if forest_contains(&vm.tree.roots, &reference) {
                    vm.tree.current = Some(reference);
                    // Non-memory snapshots leave the machine powered off.
                    vm.power = PowerState::Off;
                    TaskOutcome::Succeeded
                } else {
                    TaskOutcome::Failed {
                        reason: format!("no such snapshot '{reference}'"),
                    }
                }
            }
        };

        Ok(outcome)
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostSession for MockHost {
    async fn list_machines(&self) -> Result<Vec<MachineSummary>> {
        let machines = self
            .machines
            .read()
            .map_err(|_| HostError::Internal("Lock poisoned".to_string()))?;

        let mut result: Vec<MachineSummary> = machines
            .values()
            .map(|vm| MachineSummary {
                name: vm.name.clone(),
                power: vm.power,
                ip_address: match vm.power {
                    PowerState::On => vm.ip_address.clone(),
                    _ => None,
                },
            })
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(count = result.len(), "Listed mock machines");
        Ok(result)
    }

    async fn find_machine(&self, name: &str) -> Result<Option<MachineHandle>> {
        let machines = self
            .machines
            .read()
            .map_err(|_| HostError::Internal("Lock poisoned".to_string()))?;

        Ok(machines.iter().find_map(|(id, vm)| {
            (vm.name == name).then(|| MachineHandle {
                id: id.clone(),
                name: vm.name.clone(),
            })
        }))
    }

    async fn snapshot_tree(&self, machine: &MachineHandle) -> Result<SnapshotTree> {
        let machines = self
            .machines
            .read()
            .map_err(|_| HostError::Internal("Lock poisoned".to_string()))?;

        let vm = machines
            .get(&machine.id)
            .ok_or_else(|| HostError::MachineNotFound(machine.name.clone()))?;

        Ok(vm.tree.clone())
    }

    async fn snapshot_raw(
        &self,
        machine: &MachineHandle,
        reference: &SnapshotRef,
    ) -> Result<String> {
        let tree = self.snapshot_tree(machine).await?;
        let mut found = None;
        crate::tree::walk(&tree, |node| {
            if node.reference == *reference {
                found = Some(node);
                crate::tree::Walk::Stop
            } else {
                crate::tree::Walk::Continue
            }
        });

        let node = found.ok_or_else(|| HostError::SnapshotNotFound {
            machine: machine.name.clone(),
            identifier: reference.to_string(),
        })?;
        serde_json::to_string_pretty(node).map_err(|e| HostError::Internal(e.to_string()))
    }

    async fn submit(&self, request: OperationRequest) -> Result<TaskHandle> {
        let primed = self
            .fail_next
            .write()
            .map_err(|_| HostError::Internal("Lock poisoned".to_string()))?
            .take();

        let outcome = match primed {
            Some(reason) => TaskOutcome::Failed { reason },
            None => self.apply(request)?,
        };
        self.record_task(outcome)
    }

    async fn wait_task(&self, task: &TaskHandle) -> Result<TaskOutcome> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|_| HostError::Internal("Lock poisoned".to_string()))?;

        tasks
            .remove(task.as_str())
            .ok_or_else(|| HostError::Protocol(format!("unknown task '{}'", task.as_str())))
    }
}

// =============================================================================
// Forest surgery helpers
// =============================================================================

fn find_mut<'a>(
    nodes: &'a mut [SnapshotNode],
    reference: &SnapshotRef,
) -> Option<&'a mut SnapshotNode> {
    for node in nodes.iter_mut() {
        if node.reference == *reference {
            return Some(node);
        }
        if let Some(hit) = find_mut(&mut node.children, reference) {
            return Some(hit);
        }
    }
    None
}

fn insert_under(nodes: &mut [SnapshotNode], parent: &SnapshotRef, child: SnapshotNode) -> bool {
    if let Some(node) = find_mut(nodes, parent) {
        node.children.push(child);
        return true;
    }
    false
}

/// Detach `target` from the forest. With `with_children` the whole subtree
/// goes; otherwise the orphaned children are spliced in at the removal
/// position. Returns the removed node and its parent's reference.
fn remove_from(
    nodes: &mut Vec<SnapshotNode>,
    parent: Option<&SnapshotRef>,
    target: &SnapshotRef,
    with_children: bool,
) -> Option<(SnapshotNode, Option<SnapshotRef>)> {
    if let Some(pos) = nodes.iter().position(|n| n.reference == *target) {
        let mut node = nodes.remove(pos);
        if !with_children {
            let orphans = std::mem::take(&mut node.children);
            for (offset, orphan) in orphans.into_iter().enumerate() {
                nodes.insert(pos + offset, orphan);
            }
        }
        return Some((node, parent.cloned()));
    }

    for node in nodes.iter_mut() {
        let parent_ref = node.reference.clone();
        if let Some(hit) = remove_from(&mut node.children, Some(&parent_ref), target, with_children)
        {
            return Some(hit);
        }
    }
    None
}

fn subtree_contains(node: &SnapshotNode, reference: &SnapshotRef) -> bool {
    node.reference == *reference || node.children.iter().any(|c| subtree_contains(c, reference))
}

fn forest_contains(nodes: &[SnapshotNode], reference: &SnapshotRef) -> bool {
    nodes.iter().any(|n| subtree_contains(n, reference))
}
