//! Command-level error type.

use thiserror::Error;
use vhostctl_host::HostError;

/// Errors surfaced by the CLI on top of the host layer.
///
/// Every error is terminal for the running command: it propagates to main,
/// is printed once under the `Error:` banner, and the process exits 1.
#[derive(Error, Debug)]
pub enum CliError {
    /// The config file exists but could not be read or parsed.
    #[error("Error parsing {path} - '{reason}'")]
    Config { path: String, reason: String },

    /// host/user/password still unset after merging flags and file.
    #[error("Missing {0} setting")]
    MissingCredential(&'static str),

    #[error(transparent)]
    Host(#[from] HostError),
}
