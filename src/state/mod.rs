//! State management module
//!
//! Plain data shared between the countdown core, the control loop and the API.

pub mod app_state;
pub mod command;
pub mod power_action;
pub mod status;
pub mod visibility;

// Re-export main types
pub use app_state::AppState;
pub use command::Command;
pub use power_action::PowerAction;
pub use status::{format_remaining, Phase, Status};
pub use visibility::{VisibilityMode, WindowFlags, WindowState};
