//! Commands delivered to the control loop

use tokio::sync::oneshot;

use crate::countdown::{CloseDecision, TransitionToken};

/// Everything that can happen to the countdown besides a tick.
///
/// Commands are processed one at a time on the control loop, so handlers
/// never interleave with a tick.
#[derive(Debug)]
pub enum Command {
    /// Tray "hide" request
    Hide,
    /// Tray "show" request
    Show,
    /// Reset the countdown to its full duration
    RestartTimer,
    /// Re-execute the process with the same arguments
    RestartApplication,
    /// A close request from a signal or the control API
    Close {
        reply: Option<oneshot::Sender<CloseDecision>>,
    },
    /// Answer from the confirmation prompt opened by a close request
    CloseAnswered(bool),
    /// The platform finished processing a visibility transition
    Settled(TransitionToken),
}
