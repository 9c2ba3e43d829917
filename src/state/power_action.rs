//! Power actions the countdown can end with

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The OS-level operation executed when the countdown expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    Shutdown,
    Restart,
    Hibernate,
    Sleep,
    Logout,
    Lock,
}

impl PowerAction {
    /// Whether the graceful/forced distinction changes what is executed.
    ///
    /// Hibernate, sleep and lock have no forced variant at the OS level.
    pub fn honours_graceful(&self) -> bool {
        matches!(self, Self::Shutdown | Self::Restart | Self::Logout)
    }

    /// Short verb used in display text ("Shutdown in 5m 0s")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Shutdown => "Shutdown",
            Self::Restart => "Restart",
            Self::Hibernate => "Hibernate",
            Self::Sleep => "Sleep",
            Self::Logout => "Log out",
            Self::Lock => "Lock",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
