//! Power action dispatch through systemd

use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::{countdown::PowerDispatcher, state::PowerAction};

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl PowerCommand {
    fn new(program: &'static str, args: &[&str]) -> Self {
        Self {
            program,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Shell-like rendering for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Map an action to the command that performs it.
///
/// Graceful variants go through logind and honour its inhibitor locks, so
/// running applications can delay or block them. Forced variants ignore the
/// locks, or kill the session outright for logout.
pub fn power_command(action: PowerAction, graceful: bool, session_id: &str) -> PowerCommand {
    match (action, graceful) {
        (PowerAction::Shutdown, true) => PowerCommand::new("systemctl", &["poweroff"]),
        (PowerAction::Shutdown, false) => {
            PowerCommand::new("systemctl", &["poweroff", "--ignore-inhibitors"])
        }
        (PowerAction::Restart, true) => PowerCommand::new("systemctl", &["reboot"]),
        (PowerAction::Restart, false) => {
            PowerCommand::new("systemctl", &["reboot", "--ignore-inhibitors"])
        }
        (PowerAction::Logout, true) => {
            PowerCommand::new("loginctl", &["terminate-session", session_id])
        }
        (PowerAction::Logout, false) => PowerCommand::new(
            "loginctl",
            &["kill-session", session_id, "--signal=SIGKILL"],
        ),
        (PowerAction::Hibernate, _) => PowerCommand::new("systemctl", &["hibernate"]),
        (PowerAction::Sleep, _) => PowerCommand::new("systemctl", &["suspend"]),
        (PowerAction::Lock, _) => PowerCommand::new("loginctl", &["lock-session"]),
    }
}

/// Session to log out of: `$XDG_SESSION_ID`, or logind's "self"
pub fn current_session_id() -> String {
    std::env::var("XDG_SESSION_ID")
        .ok()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| "self".to_string())
}

/// Runs power commands; the outcome is only logged
#[derive(Debug, Clone)]
pub struct SystemPowerDispatcher {
    session_id: String,
    dry_run: bool,
}

impl SystemPowerDispatcher {
    pub fn new(dry_run: bool) -> Self {
        Self {
            session_id: current_session_id(),
            dry_run,
        }
    }
}

impl PowerDispatcher for SystemPowerDispatcher {
    fn dispatch(&mut self, action: PowerAction, graceful: bool) {
        let command = power_command(action, graceful, &self.session_id);
        if !graceful && !action.honours_graceful() {
            debug!("{} has no forced variant, running it as usual", action);
        }

        if self.dry_run {
            info!("Dry run, not executing: {}", command.display());
            return;
        }

        info!("Executing {}: {}", action, command.display());

        // Spawned right away so the process can exit without waiting on it
        let child = match Command::new(command.program).args(&command.args).spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to execute {}: {}", command.display(), e);
                return;
            }
        };

        let command_line = command.display();
        tokio::spawn(async move {
            let mut child = child;
            match child.wait().await {
                Ok(status) if status.success() => debug!("{} finished", command_line),
                Ok(status) => warn!("{} failed: {}", command_line, status),
                Err(e) => warn!("Failed to wait for {}: {}", command_line, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(action: PowerAction, graceful: bool) -> String {
        power_command(action, graceful, "7").display()
    }

    #[test]
    fn graceful_actions_honour_inhibitors() {
        assert_eq!(rendered(PowerAction::Shutdown, true), "systemctl poweroff");
        assert_eq!(rendered(PowerAction::Restart, true), "systemctl reboot");
        assert_eq!(rendered(PowerAction::Logout, true), "loginctl terminate-session 7");
    }

    #[test]
    fn forced_actions_ignore_inhibitors() {
        assert_eq!(
            rendered(PowerAction::Shutdown, false),
            "systemctl poweroff --ignore-inhibitors"
        );
        assert_eq!(
            rendered(PowerAction::Restart, false),
            "systemctl reboot --ignore-inhibitors"
        );
        assert_eq!(
            rendered(PowerAction::Logout, false),
            "loginctl kill-session 7 --signal=SIGKILL"
        );
    }

    #[test]
    fn graceful_flag_is_ignored_where_meaningless() {
        for action in [PowerAction::Hibernate, PowerAction::Sleep, PowerAction::Lock] {
            assert_eq!(
                power_command(action, true, "1"),
                power_command(action, false, "1")
            );
        }
        assert_eq!(rendered(PowerAction::Hibernate, false), "systemctl hibernate");
        assert_eq!(rendered(PowerAction::Sleep, true), "systemctl suspend");
        assert_eq!(rendered(PowerAction::Lock, true), "loginctl lock-session");
    }

    #[test]
    fn dry_run_dispatch_does_not_need_a_runtime() {
        let mut dispatcher = SystemPowerDispatcher::new(true);
        dispatcher.dispatch(PowerAction::Shutdown, true);
    }
}
