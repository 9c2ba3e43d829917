//! Countdown core
//!
//! The state machines that decide when the power action runs, which display
//! mode is authoritative and whether a close request may proceed. Nothing in
//! here touches the OS directly; every side effect goes through the traits in
//! [`collaborators`].

use std::time::Duration;

pub mod clock;
pub mod close;
pub mod collaborators;
pub mod engine;
pub mod milestones;
pub mod session;
pub mod visibility;

#[cfg(test)]
pub(crate) mod fakes;

/// Period of the countdown tick
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Added to the remaining time so tick-start latency does not make the first
/// displayed second look skipped
pub const LEAD_IN: Duration = Duration::from_secs(1);

/// Fallback delay after which a visibility transition counts as processed
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

// Re-export main types
pub use clock::{ManualClock, MonotonicClock, Stopwatch, TimeSource};
pub use close::{CloseDecision, CloseGuard, CloseNegotiator, TransitionToken};
pub use collaborators::{Collaborators, Frame, Notice, Notifier, PowerDispatcher, SleepGuard, Surface};
pub use engine::{CountdownEngine, TickOutcome};
pub use milestones::{Milestone, MilestoneTracker};
pub use session::{Flow, Session};
pub use visibility::{Transition, VisibilityController};
