//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vhostctl - Virtualization host control utility
#[derive(Parser, Debug)]
#[command(name = "vhostctl")]
#[command(about = "Virtualization host control utility")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to connect to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Host user name
    #[arg(short, long)]
    pub user: Option<String>,

    /// Host user's password
    #[arg(short, long)]
    pub password: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Use an in-memory mock host instead of connecting (development)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List virtual machines on the host
    VmList,

    /// Start a machine
    Start {
        #[arg(value_name = "VM_NAME")]
        vm_name: String,
    },

    /// Stop a machine
    Stop {
        #[arg(value_name = "VM_NAME")]
        vm_name: String,
    },

    /// Reset a machine
    Reset {
        #[arg(value_name = "VM_NAME")]
        vm_name: String,
    },

    /// List snapshots for a machine
    SnapList {
        #[arg(value_name = "VM_NAME")]
        vm_name: String,
    },

    /// Create a snapshot of a machine
    SnapCreate {
        #[arg(value_name = "VM_NAME")]
        vm_name: String,
        #[arg(value_name = "SNAP")]
        snap: String,
    },

    /// Remove a snapshot (and its children) from a machine
    SnapRemove {
        #[arg(value_name = "VM_NAME")]
        vm_name: String,
        #[arg(value_name = "SNAP")]
        snap: String,
        /// Treat the snapshot argument as a snapshot id
        #[arg(short = 'i', long)]
        by_id: bool,
    },

    /// Revert a machine to a snapshot (default: the current one)
    Revert {
        #[arg(value_name = "VM_NAME")]
        vm_name: String,
        #[arg(value_name = "SNAP")]
        snap: Option<String>,
        /// Treat the snapshot argument as a snapshot id
        #[arg(short = 'i', long)]
        by_id: bool,
        /// Start the machine after the revert
        #[arg(short = 's', long)]
        start: bool,
    },

    /// Show the host's raw record of a snapshot
    SnapRawInfo {
        #[arg(value_name = "VM_NAME")]
        vm_name: String,
        #[arg(value_name = "SNAP")]
        snap: String,
        /// Treat the snapshot argument as a snapshot id
        #[arg(short = 'i', long)]
        by_id: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_revert_flags() {
        let args =
            Args::try_parse_from(["vhostctl", "revert", "web-01", "nightly", "-i", "-s"]).unwrap();
        match args.command {
            Command::Revert {
                vm_name,
                snap,
                by_id,
                start,
            } => {
                assert_eq!(vm_name, "web-01");
                assert_eq!(snap.as_deref(), Some("nightly"));
                assert!(by_id);
                assert!(start);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_revert_snapshot_is_optional() {
        let args = Args::try_parse_from(["vhostctl", "revert", "web-01"]).unwrap();
        match args.command {
            Command::Revert { snap, .. } => assert!(snap.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let args = Args::try_parse_from([
            "vhostctl", "-H", "esx1.lab", "-u", "root", "-p", "secret", "vm-list",
        ])
        .unwrap();
        assert_eq!(args.host.as_deref(), Some("esx1.lab"));
        assert_eq!(args.user.as_deref(), Some("root"));
        assert!(matches!(args.command, Command::VmList));
    }
}
