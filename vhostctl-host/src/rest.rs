//! Remote host backend over the host's REST API.
//!
//! One authenticated session per command invocation: `connect` opens it,
//! [`HostSession::close`] releases it. Certificate validation is disabled,
//! matching how these appliance endpoints are typically deployed with
//! self-signed certificates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{HostError, Result};
use crate::session::HostSession;
use crate::task::{OperationRequest, TaskHandle, TaskOutcome};
use crate::types::{MachineHandle, MachineSummary, PowerState, SnapshotRef, SnapshotTree};

/// Poll cadence while waiting on a task.
const TASK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Per-request timeout. Task waits are a sequence of short polls, so this
/// never bounds how long an operation itself may run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An authenticated REST session against a virtualization host.
pub struct RemoteHost {
    base: String,
    client: reqwest::Client,
    token: String,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    user: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct MachineRecord {
    id: String,
    name: String,
    power: PowerState,
    #[serde(default)]
    ip_address: Option<String>,
}

#[derive(Deserialize)]
struct SubmitResponse {
    task: TaskHandle,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum TaskState {
    Queued,
    Running,
    Success,
    Error,
}

#[derive(Debug, Deserialize)]
struct TaskRecord {
    state: TaskState,
    #[serde(default)]
    error: Option<String>,
}

// =============================================================================
// Session
// =============================================================================

impl RemoteHost {
    /// Authenticate against the host and open a session.
    pub async fn connect(host: &str, user: &str, password: &str) -> Result<Self> {
        let base = base_url(host);
        debug!(host = %base, user = %user, "Connecting to host");

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HostError::Connection(e.to_string()))?;

        let response = client
            .post(format!("{base}/api/session"))
            .json(&LoginRequest { user, password })
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(HostError::Authentication(format!(
                "host rejected credentials for user '{user}'"
            )));
        }
        let login: LoginResponse = expect_ok(response).await?
            .json()
            .await
            .map_err(|e| HostError::Protocol(e.to_string()))?;

        Ok(Self {
            base,
            client,
            token: login.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport_error)?;
        expect_ok(response).await
    }

    async fn machine_records(&self) -> Result<Vec<MachineRecord>> {
        self.get("machines")
            .await?
            .json()
            .await
            .map_err(|e| HostError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl HostSession for RemoteHost {
    async fn list_machines(&self) -> Result<Vec<MachineSummary>> {
        let records = self.machine_records().await?;
        Ok(records
            .into_iter()
            .map(|m| MachineSummary {
                name: m.name,
                power: m.power,
                ip_address: m.ip_address,
            })
            .collect())
    }

    async fn find_machine(&self, name: &str) -> Result<Option<MachineHandle>> {
        let records = self.machine_records().await?;
        Ok(records.into_iter().find_map(|m| {
            (m.name == name).then_some(MachineHandle {
                id: m.id,
                name: name.to_string(),
            })
        }))
    }

    async fn snapshot_tree(&self, machine: &MachineHandle) -> Result<SnapshotTree> {
        self.get(&format!("machines/{}/snapshots", machine.id))
            .await?
            .json()
            .await
            .map_err(|e| HostError::Protocol(e.to_string()))
    }

    async fn snapshot_raw(
        &self,
        machine: &MachineHandle,
        reference: &SnapshotRef,
    ) -> Result<String> {
        self.get(&format!(
            "machines/{}/snapshots/{}/raw",
            machine.id, reference
        ))
        .await?
        .text()
        .await
        .map_err(|e| HostError::Protocol(e.to_string()))
    }

    async fn submit(&self, request: OperationRequest) -> Result<TaskHandle> {
        let response = self
            .client
            .post(self.url("tasks"))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let submitted: SubmitResponse = expect_ok(response).await?
            .json()
            .await
            .map_err(|e| HostError::Protocol(e.to_string()))?;
        debug!(task = %submitted.task.as_str(), "Operation submitted");
        Ok(submitted.task)
    }

    async fn wait_task(&self, task: &TaskHandle) -> Result<TaskOutcome> {
        loop {
            let record: TaskRecord = self
                .get(&format!("tasks/{}", task.as_str()))
                .await?
                .json()
                .await
                .map_err(|e| HostError::Protocol(e.to_string()))?;

            match record.state {
                TaskState::Success => return Ok(TaskOutcome::Succeeded),
                TaskState::Error => {
                    return Ok(TaskOutcome::Failed {
                        reason: record
                            .error
                            .unwrap_or_else(|| "unspecified host error".to_string()),
                    })
                }
                TaskState::Queued | TaskState::Running => {
                    tokio::time::sleep(TASK_POLL_INTERVAL).await;
                }
            }
        }
    }

    async fn close(&self) {
        let result = self
            .client
            .delete(self.url("session"))
            .bearer_auth(&self.token)
            .send()
            .await;
        if let Err(e) = result {
            warn!(error = %e, "Failed to release host session");
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn base_url(host: &str) -> String {
    let trimmed = host.trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn transport_error(e: reqwest::Error) -> HostError {
    if e.is_connect() || e.is_timeout() {
        HostError::Connection(e.to_string())
    } else {
        HostError::Protocol(e.to_string())
    }
}

async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(HostError::Authentication("session expired".to_string()));
    }
    let body = response.text().await.unwrap_or_default();
    Err(HostError::Protocol(format!(
        "host returned {status}: {body}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_adds_scheme() {
        assert_eq!(base_url("esx1.lab"), "https://esx1.lab");
        assert_eq!(base_url("http://esx1.lab/"), "http://esx1.lab");
    }

    #[test]
    fn test_task_record_parsing() {
        let record: TaskRecord =
            serde_json::from_str(r#"{"state":"error","error":"disk locked"}"#).unwrap();
        assert_eq!(record.state, TaskState::Error);
        assert_eq!(record.error.as_deref(), Some("disk locked"));

        let record: TaskRecord = serde_json::from_str(r#"{"state":"running"}"#).unwrap();
        assert_eq!(record.state, TaskState::Running);
        assert!(record.error.is_none());
    }

    #[test]
    fn test_operation_request_wire_shape() {
        let request = OperationRequest::RemoveSnapshot {
            machine: "vm-12".to_string(),
            reference: SnapshotRef::new("snap-7"),
            with_children: true,
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["kind"], "remove-snapshot");
        assert_eq!(wire["reference"], "snap-7");
        assert_eq!(wire["with_children"], true);
    }
}
