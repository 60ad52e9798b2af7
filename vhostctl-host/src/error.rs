//! Error types for host sessions and snapshot resolution.

use thiserror::Error;

/// Errors that can occur while talking to the host or resolving snapshots.
#[derive(Error, Debug)]
pub enum HostError {
    /// Failed to reach the host (TCP/TLS/transport).
    #[error("Error connecting to host - '{0}'")]
    Connection(String),

    /// The host rejected the supplied credentials.
    #[error("Invalid login details - '{0}'")]
    Authentication(String),

    /// No machine with the given name exists on the host.
    #[error("Unable to find machine '{0}'")]
    MachineNotFound(String),

    /// A by-id lookup was given a non-numeric identifier.
    #[error("Illegal snapshot id - '{0}'")]
    InvalidIdentifier(String),

    /// No snapshot matched the identifier.
    #[error("Machine '{machine}' has no such snapshot - '{identifier}'")]
    SnapshotNotFound { machine: String, identifier: String },

    /// More than one snapshot matched; the caller must use the numeric id.
    #[error("Machine '{machine}' has multiple snapshots named '{identifier}', use the snapshot id")]
    AmbiguousSnapshot { machine: String, identifier: String },

    /// A long-running operation reached a failed terminal state.
    #[error("{label} - '{reason}'")]
    OperationFailed { label: String, reason: String },

    /// The host answered with something we could not interpret.
    #[error("Unexpected host response: {0}")]
    Protocol(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
