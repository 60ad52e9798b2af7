//! Machine inventory and power commands.

use vhostctl_host::{execute, locate, HostSession, OperationRequest, PowerState};

use crate::error::CliError;

fn vm_row(name: &str, power: &str, ip: &str) -> String {
    format!("{name:<60}{power:<8}{ip:<18}")
}

/// Print the host's machine inventory.
pub async fn vm_list(session: &dyn HostSession) -> Result<(), CliError> {
    println!("{}", vm_row("Name", "Power", "IP Address"));
    println!("{}", vm_row("----", "-----", "----------"));

    for machine in session.list_machines().await? {
        let power = match machine.power {
            PowerState::On => "On",
            PowerState::Off => "Off",
            PowerState::Suspended => "n/a",
        };
        let ip = match machine.power {
            PowerState::On => machine.ip_address.as_deref().unwrap_or("n/a"),
            _ => "n/a",
        };
        println!("{}", vm_row(&machine.name, power, ip));
    }
    Ok(())
}

pub async fn start(session: &dyn HostSession, vm_name: &str) -> Result<(), CliError> {
    let vm = locate(session, vm_name).await?;
    execute(
        session,
        OperationRequest::PowerOn { machine: vm.id },
        "Error starting machine",
    )
    .await?;
    Ok(())
}

pub async fn stop(session: &dyn HostSession, vm_name: &str) -> Result<(), CliError> {
    let vm = locate(session, vm_name).await?;
    execute(
        session,
        OperationRequest::PowerOff { machine: vm.id },
        "Error stopping machine",
    )
    .await?;
    Ok(())
}

pub async fn reset(session: &dyn HostSession, vm_name: &str) -> Result<(), CliError> {
    let vm = locate(session, vm_name).await?;
    execute(
        session,
        OperationRequest::Reset { machine: vm.id },
        "Error resetting machine",
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vhostctl_host::{HostError, MockHost};

    #[tokio::test]
    async fn test_start_unknown_machine() {
        let host = MockHost::new();
        let err = start(&host, "ghost").await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Host(HostError::MachineNotFound(ref name)) if name == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_reset_requires_running_machine() {
        let host = MockHost::new();
        host.add_machine("web-01");

        let err = reset(&host, "web-01").await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Host(HostError::OperationFailed { ref label, .. })
                if label == "Error resetting machine"
        ));

        start(&host, "web-01").await.unwrap();
        reset(&host, "web-01").await.unwrap();
    }
}
