//! System services module
//!
//! Implementations of the countdown's collaborators against the real system:
//! systemd for power actions and sleep inhibition, the terminal for display
//! and confirmation.

pub mod power;
pub mod process;
pub mod prompt;
pub mod sleep_guard;
pub mod system;
pub mod terminal;

// Re-export main types
pub use power::{power_command, SystemPowerDispatcher};
pub use process::restart_process;
pub use prompt::{Confirm, FixedAnswer, TerminalPrompt};
pub use sleep_guard::InhibitorSleepGuard;
pub use system::{check_power_tools, check_tool_available};
pub use terminal::{TerminalNotifier, TerminalSurface, WindowHandle};
