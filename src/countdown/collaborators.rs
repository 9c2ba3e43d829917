//! Capabilities the countdown core calls out to
//!
//! The core never inspects the result of these calls; implementations log
//! their own failures.

use std::time::Duration;

use super::{clock::TimeSource, milestones::Milestone};
use crate::state::{PowerAction, VisibilityMode, WindowFlags, WindowState};

/// Executes the OS power operation; fire-and-forget
pub trait PowerDispatcher: Send {
    fn dispatch(&mut self, action: PowerAction, graceful: bool);
}

/// Process-wide "keep the system awake" request
pub trait SleepGuard: Send {
    fn assert(&mut self);
    fn clear(&mut self);
}

/// What the display renders on a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub remaining: Duration,
    pub mode: VisibilityMode,
    pub action: PowerAction,
    pub annotation: Option<&'a str>,
}

/// The window (or whatever stands in for it)
pub trait Surface: Send {
    /// Render the remaining time
    fn refresh(&mut self, frame: &Frame<'_>);
    /// Apply visibility flags for a mode transition
    fn apply(&mut self, flags: &WindowFlags);
    /// Current window state as the platform sees it
    fn observe(&self) -> WindowState;
}

/// One-shot user notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Remaining time crossed a milestone
    Milestone { mark: Milestone, remaining: Duration },
    /// Window went to the tray while counting down
    Backgrounded { remaining: Duration },
    /// The countdown was cancelled by the user
    Cancelled { action: PowerAction },
}

pub trait Notifier: Send {
    fn notify(&mut self, notice: Notice);
}

/// Everything a session needs from the outside world
pub struct Collaborators {
    pub clock: Box<dyn TimeSource>,
    pub dispatcher: Box<dyn PowerDispatcher>,
    pub sleep_guard: Box<dyn SleepGuard>,
    pub surface: Box<dyn Surface>,
    pub notifier: Box<dyn Notifier>,
}
