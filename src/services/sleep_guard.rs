//! Keep-awake request backed by a `systemd-inhibit` child process

use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::{countdown::SleepGuard, state::PowerAction};

/// Arguments for the inhibitor that holds an idle lock until killed.
///
/// Only idle is blocked: a sleep lock would also refuse our own suspend or
/// hibernate at expiry, since killing the child does not wait for logind to
/// drop the lock.
pub fn inhibit_args(action: PowerAction) -> Vec<String> {
    vec![
        "--what=idle".to_string(),
        "--who=lights-out".to_string(),
        format!("--why=Countdown to {} running", action.label().to_lowercase()),
        "--mode=block".to_string(),
        "sleep".to_string(),
        "infinity".to_string(),
    ]
}

/// Holds a logind inhibitor lock while asserted.
///
/// The child is killed on clear and on drop, so the lock cannot outlive the
/// process.
#[derive(Debug)]
pub struct InhibitorSleepGuard {
    action: PowerAction,
    dry_run: bool,
    child: Option<Child>,
    asserted: bool,
}

impl InhibitorSleepGuard {
    pub fn new(action: PowerAction, dry_run: bool) -> Self {
        Self {
            action,
            dry_run,
            child: None,
            asserted: false,
        }
    }

    pub fn is_asserted(&self) -> bool {
        self.asserted
    }
}

impl SleepGuard for InhibitorSleepGuard {
    fn assert(&mut self) {
        if self.asserted {
            return;
        }
        self.asserted = true;

        if self.dry_run {
            info!("Dry run, keep-awake request not sent to logind");
            return;
        }

        let spawned = Command::new("systemd-inhibit")
            .args(inhibit_args(self.action))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                debug!("systemd-inhibit started (pid {:?})", child.id());
                self.child = Some(child);
                info!("Keeping the system awake until the countdown ends");
            }
            Err(e) => warn!("Failed to start systemd-inhibit, system may sleep: {}", e),
        }
    }

    fn clear(&mut self) {
        if !self.asserted {
            return;
        }
        self.asserted = false;

        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                warn!("Failed to stop systemd-inhibit: {}", e);
            } else {
                info!("Keep-awake request released");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inhibits_idle_until_killed() {
        let args = inhibit_args(PowerAction::Shutdown);
        assert_eq!(args[0], "--what=idle");
        assert_eq!(args[2], "--why=Countdown to shutdown running");
        assert_eq!(args[3], "--mode=block");
        assert_eq!(&args[4..], ["sleep", "infinity"]);
    }

    #[test]
    fn never_blocks_our_own_suspend_or_hibernate() {
        for action in [PowerAction::Sleep, PowerAction::Hibernate] {
            let args = inhibit_args(action);
            let what = args
                .iter()
                .find(|arg| arg.starts_with("--what="))
                .unwrap();
            assert!(!what.contains("sleep"), "{} blocks sleep: {}", action, what);
            assert!(!what.contains("shutdown"), "{} blocks shutdown: {}", action, what);
        }
    }

    #[test]
    fn assert_and_clear_are_idempotent() {
        let mut guard = InhibitorSleepGuard::new(PowerAction::Sleep, true);
        guard.clear();
        assert!(!guard.is_asserted());

        guard.assert();
        guard.assert();
        assert!(guard.is_asserted());

        guard.clear();
        guard.clear();
        assert!(!guard.is_asserted());
    }
}
