//! lights-out - Shut down, restart, suspend or lock the system when a countdown runs out
//!
//! The countdown core lives in [`countdown`]; [`services`] connects it to
//! systemd and the terminal, [`tasks`] drives it, and [`api`] exposes an
//! optional HTTP control surface.

pub mod api;
pub mod config;
pub mod countdown;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, CountdownConfig};
pub use countdown::{Flow, Session};
pub use state::{AppState, PowerAction};
pub use tasks::run_control_loop;
