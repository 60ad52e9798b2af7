//! The long-running-operation protocol.
//!
//! Every mutating host call (power changes, snapshot create/remove/revert)
//! goes through the same submit-then-wait exchange: one submission, one wait,
//! one terminal outcome, no retry and no cancellation. A failed outcome
//! surfaces as [`HostError::OperationFailed`] carrying the caller-supplied
//! label and the host's reason.

use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};
use crate::session::HostSession;
use crate::types::SnapshotRef;

/// Handle for a submitted host-side task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Terminal outcome reported by the host for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed { reason: String },
}

/// A mutating request submitted to the host.
///
/// `machine` is always the host-side machine id from a [`MachineHandle`];
/// snapshot targets are addressed by reference, never by display id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OperationRequest {
    PowerOn {
        machine: String,
    },
    PowerOff {
        machine: String,
    },
    Reset {
        machine: String,
    },
    CreateSnapshot {
        machine: String,
        name: String,
        description: String,
        memory: bool,
        quiesce: bool,
    },
    RemoveSnapshot {
        machine: String,
        reference: SnapshotRef,
        with_children: bool,
    },
    RevertSnapshot {
        machine: String,
        reference: SnapshotRef,
    },
}

/// Lifecycle of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    /// The request has been issued and the host returned a task handle.
    Submitted,
    /// Waiting on the host to report a terminal state.
    Polling,
    Succeeded,
    Failed(String),
}

/// One submit-then-wait exchange with the host.
#[derive(Debug)]
pub struct Operation {
    label: String,
    handle: TaskHandle,
    state: OperationState,
}

impl Operation {
    /// Issue the request to the host. On return the operation is `Submitted`.
    pub async fn submit(
        session: &dyn HostSession,
        request: OperationRequest,
        label: impl Into<String>,
    ) -> Result<Self> {
        let handle = session.submit(request).await?;
        Ok(Self {
            label: label.into(),
            handle,
            state: OperationState::Submitted,
        })
    }

    /// Block until the host reports a terminal state.
    ///
    /// Exactly one wait per submission. A failed outcome becomes
    /// [`HostError::OperationFailed`] with this operation's label and the
    /// host-supplied reason.
    pub async fn wait(&mut self, session: &dyn HostSession) -> Result<()> {
        self.state = OperationState::Polling;
        match session.wait_task(&self.handle).await? {
            TaskOutcome::Succeeded => {
                self.state = OperationState::Succeeded;
                Ok(())
            }
            TaskOutcome::Failed { reason } => {
                self.state = OperationState::Failed(reason.clone());
                Err(HostError::OperationFailed {
                    label: self.label.clone(),
                    reason,
                })
            }
        }
    }

    pub fn state(&self) -> &OperationState {
        &self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Submit a request and wait it to a terminal outcome.
///
/// This is the form every command uses; [`Operation`] is exposed separately
/// so the two phases stay observable.
pub async fn execute(
    session: &dyn HostSession,
    request: OperationRequest,
    label: &str,
) -> Result<()> {
    let mut op = Operation::submit(session, request, label).await?;
    op.wait(session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    #[tokio::test]
    async fn test_operation_states_on_success() {
        let host = MockHost::new();
        let machine = host.add_machine("vm1");

        let mut op = Operation::submit(
            &host,
            OperationRequest::PowerOn {
                machine: machine.id.clone(),
            },
            "Error starting machine",
        )
        .await
        .unwrap();
        assert_eq!(*op.state(), OperationState::Submitted);

        op.wait(&host).await.unwrap();
        assert_eq!(*op.state(), OperationState::Succeeded);
    }

    #[tokio::test]
    async fn test_failed_task_carries_label_and_reason() {
        let host = MockHost::new();
        let machine = host.add_machine("vm1");
        host.fail_next_task("disk locked");

        let err = execute(
            &host,
            OperationRequest::PowerOff {
                machine: machine.id.clone(),
            },
            "Error removing snapshots",
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error removing snapshots - 'disk locked'"
        );
    }

    #[tokio::test]
    async fn test_failed_operation_records_state() {
        let host = MockHost::new();
        let machine = host.add_machine("vm1");
        host.fail_next_task("disk locked");

        let mut op = Operation::submit(
            &host,
            OperationRequest::Reset {
                machine: machine.id.clone(),
            },
            "Error resetting machine",
        )
        .await
        .unwrap();
        let _ = op.wait(&host).await;
        assert_eq!(
            *op.state(),
            OperationState::Failed("disk locked".to_string())
        );
    }
}
