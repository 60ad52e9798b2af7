//! # vhostctl Host
//!
//! Host access layer and snapshot tree model for the vhostctl utility.
//!
//! This crate provides:
//! - the [`HostSession`] trait, the boundary every command talks through
//! - the snapshot tree data model and its traversal, resolution, and
//!   current-snapshot tracking
//! - the long-running-operation protocol wrapping every mutating call
//! - two backends: [`RemoteHost`] (REST) and [`MockHost`] (in-memory, for
//!   development and tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vhostctl_host::{execute, locate, MockHost, OperationRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let host = MockHost::new();
//!     host.add_machine("web-01");
//!
//!     let vm = locate(&host, "web-01").await.unwrap();
//!     execute(
//!         &host,
//!         OperationRequest::PowerOn { machine: vm.id.clone() },
//!         "Error starting machine",
//!     )
//!     .await
//!     .unwrap();
//! }
//! ```

pub mod error;
pub mod mock;
pub mod resolver;
pub mod rest;
pub mod session;
pub mod task;
pub mod tree;
pub mod types;

pub use error::{HostError, Result};
pub use mock::MockHost;
pub use resolver::{resolve, Selector};
pub use rest::RemoteHost;
pub use session::{locate, HostSession};
pub use task::{execute, Operation, OperationRequest, OperationState, TaskHandle, TaskOutcome};
pub use tree::{current_snapshot, walk, Walk, MAX_DEPTH};
pub use types::{
    MachineHandle, MachineSummary, PowerState, SnapshotNode, SnapshotRef, SnapshotTree,
};
