//! # vhostctl
//!
//! Operator CLI for a virtualization host: machine power control and
//! snapshot management.
//!
//! ## Usage
//! ```bash
//! vhostctl -H esx1.lab -u root -p secret vm-list
//! vhostctl snap-create my-vm nightly
//! vhostctl revert my-vm -s
//! ```

use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod config;
mod error;

use cli::{Args, Command};
use config::{Credentials, FileConfig};
use error::CliError;
use vhostctl_host::{HostSession, MockHost, RemoteHost};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        println!("\nError:\n\t{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    vhostctl_common::init_logging(&args.log_level)?;

    let session = connect(&args).await?;

    // The session is released on every exit path, command error included.
    let result = dispatch(session.as_ref(), &args.command).await;
    session.close().await;

    result.map_err(Into::into)
}

async fn connect(args: &Args) -> Result<Box<dyn HostSession>, CliError> {
    if args.dev {
        debug!("Using in-memory mock host");
        let host = MockHost::new();
        host.add_machine("demo-01");
        host.add_machine("demo-02");
        return Ok(Box::new(host));
    }

    let file = FileConfig::load(args.config.as_deref())?;
    let credentials = Credentials::resolve(args, &file)?;
    let session =
        RemoteHost::connect(&credentials.host, &credentials.user, &credentials.password).await?;
    Ok(Box::new(session))
}

async fn dispatch(session: &dyn HostSession, command: &Command) -> Result<(), CliError> {
    match command {
        Command::VmList => commands::machine::vm_list(session).await,
        Command::Start { vm_name } => commands::machine::start(session, vm_name).await,
        Command::Stop { vm_name } => commands::machine::stop(session, vm_name).await,
        Command::Reset { vm_name } => commands::machine::reset(session, vm_name).await,
        Command::SnapList { vm_name } => commands::snapshot::snap_list(session, vm_name).await,
        Command::SnapCreate { vm_name, snap } => {
            commands::snapshot::snap_create(session, vm_name, snap).await
        }
        Command::SnapRemove {
            vm_name,
            snap,
            by_id,
        } => commands::snapshot::snap_remove(session, vm_name, snap, *by_id).await,
        Command::Revert {
            vm_name,
            snap,
            by_id,
            start,
        } => commands::snapshot::revert(session, vm_name, snap.as_deref(), *by_id, *start).await,
        Command::SnapRawInfo {
            vm_name,
            snap,
            by_id,
        } => commands::snapshot::snap_raw_info(session, vm_name, snap, *by_id).await,
    }
}
