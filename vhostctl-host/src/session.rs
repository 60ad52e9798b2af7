//! The host session boundary.

use async_trait::async_trait;

use crate::error::{HostError, Result};
use crate::task::{OperationRequest, TaskHandle, TaskOutcome};
use crate::types::{MachineHandle, MachineSummary, SnapshotRef, SnapshotTree};

/// An authenticated connection to a virtualization host.
///
/// All host access goes through this trait: inventory enumeration, snapshot
/// tree reads, and the submit/wait halves of the long-running-operation
/// protocol. Implementations are the remote REST client and the in-memory
/// mock used for development and tests.
#[async_trait]
pub trait HostSession: Send + Sync {
    // =========================================================================
    // Inventory
    // =========================================================================

    /// Enumerate the machines on the host.
    async fn list_machines(&self) -> Result<Vec<MachineSummary>>;

    /// Look up a machine by name. `None` means the machine does not exist;
    /// callers that need a hard failure use [`locate`].
    async fn find_machine(&self, name: &str) -> Result<Option<MachineHandle>>;

    // =========================================================================
    // Snapshot state
    // =========================================================================

    /// Fetch the machine's snapshot forest and current-snapshot pointer.
    async fn snapshot_tree(&self, machine: &MachineHandle) -> Result<SnapshotTree>;

    /// The host's verbatim record of one snapshot (debug/inspection path).
    async fn snapshot_raw(
        &self,
        machine: &MachineHandle,
        reference: &SnapshotRef,
    ) -> Result<String>;

    // =========================================================================
    // Long-running operations
    // =========================================================================

    /// Submit a mutating request; returns the handle to wait on.
    async fn submit(&self, request: OperationRequest) -> Result<TaskHandle>;

    /// Block until the task reaches a terminal state.
    async fn wait_task(&self, task: &TaskHandle) -> Result<TaskOutcome>;

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the session. Best-effort: failures are logged, not surfaced.
    /// Called on every exit path, including after a command error.
    async fn close(&self) {}
}

/// Resolve a machine name to a handle, failing when it does not exist.
pub async fn locate(session: &dyn HostSession, name: &str) -> Result<MachineHandle> {
    session
        .find_machine(name)
        .await?
        .ok_or_else(|| HostError::MachineNotFound(name.to_string()))
}
