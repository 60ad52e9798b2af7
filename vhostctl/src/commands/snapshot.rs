//! Snapshot commands: list, create, remove, revert, raw info.

use vhostctl_host::{
    current_snapshot, execute, locate, resolve, walk, HostError, HostSession, OperationRequest,
    Selector, Walk,
};

use crate::error::CliError;

fn snap_row(id: &str, name: &str, created: &str, current: &str) -> String {
    format!("{id:<6}{name:<25}{created:<30}{current:<13}")
}

/// Print the machine's snapshot tree in pre-order, marking the current one.
pub async fn snap_list(session: &dyn HostSession, vm_name: &str) -> Result<(), CliError> {
    let vm = locate(session, vm_name).await?;
    let tree = session.snapshot_tree(&vm).await?;

    if tree.is_empty() {
        println!("No snapshots found for machine '{vm_name}'");
        return Ok(());
    }

    println!("{}", snap_row("ID", "Name", "Creation Time", "Crnt"));
    println!("{}", snap_row("--", "----", "-------------", "----"));
    walk(&tree, |node| {
        let marker = if tree.current.as_ref() == Some(&node.reference) {
            "*"
        } else {
            ""
        };
        println!(
            "{}",
            snap_row(
                &node.id.to_string(),
                &node.name,
                &node.created_at.format("%c").to_string(),
                marker,
            )
        );
        Walk::Continue
    });
    Ok(())
}

pub async fn snap_create(
    session: &dyn HostSession,
    vm_name: &str,
    snap: &str,
) -> Result<(), CliError> {
    let vm = locate(session, vm_name).await?;
    execute(
        session,
        OperationRequest::CreateSnapshot {
            machine: vm.id,
            name: snap.to_string(),
            description: String::new(),
            memory: false,
            quiesce: false,
        },
        "Error creating snapshot",
    )
    .await?;
    Ok(())
}

/// Remove a snapshot and everything below it.
pub async fn snap_remove(
    session: &dyn HostSession,
    vm_name: &str,
    snap: &str,
    by_id: bool,
) -> Result<(), CliError> {
    let vm = locate(session, vm_name).await?;
    let selector = Selector::parse(snap, by_id)?;
    let tree = session.snapshot_tree(&vm).await?;
    let node = resolve(&tree, vm_name, &selector)?;

    execute(
        session,
        OperationRequest::RemoveSnapshot {
            machine: vm.id.clone(),
            reference: node.reference.clone(),
            with_children: true,
        },
        "Error removing snapshots",
    )
    .await?;
    Ok(())
}

/// Revert to the named snapshot, or to the current one when none is given.
///
/// The optional power-on afterwards is a separate operation: the revert has
/// already committed, so its failure surfaces on its own.
pub async fn revert(
    session: &dyn HostSession,
    vm_name: &str,
    snap: Option<&str>,
    by_id: bool,
    start: bool,
) -> Result<(), CliError> {
    let vm = locate(session, vm_name).await?;
    let tree = session.snapshot_tree(&vm).await?;

    let reference = match snap {
        Some(identifier) => {
            let selector = Selector::parse(identifier, by_id)?;
            resolve(&tree, vm_name, &selector)?.reference.clone()
        }
        None => current_snapshot(&tree)
            .map(|node| node.reference.clone())
            .ok_or_else(|| HostError::SnapshotNotFound {
                machine: vm_name.to_string(),
                identifier: "current".to_string(),
            })?,
    };

    execute(
        session,
        OperationRequest::RevertSnapshot {
            machine: vm.id.clone(),
            reference,
        },
        "Error reverting snapshot",
    )
    .await?;

    if start {
        execute(
            session,
            OperationRequest::PowerOn { machine: vm.id },
            "Error starting machine",
        )
        .await?;
    }
    Ok(())
}

/// Print the host's verbatim record of a snapshot.
pub async fn snap_raw_info(
    session: &dyn HostSession,
    vm_name: &str,
    snap: &str,
    by_id: bool,
) -> Result<(), CliError> {
    let vm = locate(session, vm_name).await?;
    let selector = Selector::parse(snap, by_id)?;
    let tree = session.snapshot_tree(&vm).await?;
    let node = resolve(&tree, vm_name, &selector)?;

    let raw = session.snapshot_raw(&vm, &node.reference).await?;
    println!("{raw}");
    Ok(())
}
