//! Countdown status snapshot published to observers

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PowerAction, VisibilityMode};

/// Lifecycle phase of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Constructed but not started
    Idle,
    Running,
    /// Timer ran out and the power action was dispatched
    Expired,
    /// User confirmed a close request
    Cancelled,
    /// Application exit or restart was requested
    Stopped,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled | Self::Stopped)
    }
}

/// Snapshot of the countdown, refreshed after every tick and command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub phase: Phase,
    pub remaining_seconds: u64,
    /// Human readable remaining time ("1h 2m 3s")
    pub remaining: String,
    pub mode: VisibilityMode,
    pub action: PowerAction,
    pub graceful: bool,
    pub forced: bool,
    pub annotation: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Format a remaining duration as "1h 2m 3s", dropping leading zero units
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_remaining_with_largest_unit_first() {
        assert_eq!(format_remaining(Duration::from_secs(0)), "0s");
        assert_eq!(format_remaining(Duration::from_secs(59)), "59s");
        assert_eq!(format_remaining(Duration::from_secs(300)), "5m 0s");
        assert_eq!(format_remaining(Duration::from_secs(3723)), "1h 2m 3s");
        assert_eq!(format_remaining(Duration::from_millis(1999)), "1s");
    }

    #[test]
    fn terminal_phases() {
        assert!(!Phase::Idle.is_terminal());
        assert!(!Phase::Running.is_terminal());
        assert!(Phase::Expired.is_terminal());
        assert!(Phase::Cancelled.is_terminal());
        assert!(Phase::Stopped.is_terminal());
    }
}
