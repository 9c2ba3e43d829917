//! Availability checks for the system tools the countdown relies on

use tokio::process::Command;
use tracing::info;

use crate::state::PowerAction;

/// Programs needed to carry out `action`, plus the sleep inhibitor if used
pub fn required_tools(action: PowerAction, prevent_sleep: bool) -> Vec<&'static str> {
    let mut tools = match action {
        PowerAction::Logout | PowerAction::Lock => vec!["loginctl"],
        _ => vec!["systemctl"],
    };
    if prevent_sleep {
        tools.push("systemd-inhibit");
    }
    tools
}

/// Check that a systemd tool can be executed
pub async fn check_tool_available(program: &str) -> Result<(), String> {
    Command::new(program)
        .arg("--version")
        .output()
        .await
        .map_err(|_| format!("{} is not available. lights-out requires systemd.", program))?;

    info!("{} is available", program);
    Ok(())
}

/// Check every tool the configured countdown will call
pub async fn check_power_tools(action: PowerAction, prevent_sleep: bool) -> Result<(), String> {
    for program in required_tools(action, prevent_sleep) {
        check_tool_available(program).await?;
    }
    Ok(())
}
