//! Background tasks module
//!
//! This module contains the control loop that drives the countdown.

pub mod control_loop;

// Re-export main functions
pub use control_loop::{run_control_loop, LoopChannels, LoopTiming};
