//! Close request arbitration

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identifies one programmatic visibility transition.
///
/// Close requests are ignored while any token is outstanding. A token is only
/// retired by its own settle signal, so a late release for an old transition
/// cannot lift the guard of a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionToken(u64);

impl TransitionToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Derived guard value, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseGuard {
    /// A transition is in flight or forced mode is active
    Ignore,
    /// A terminal exit is already under way
    AllowSilently,
    AskUser,
}

/// Outcome of a single close request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseDecision {
    /// The close was cancelled and nothing else happens
    Suppressed,
    /// Let the close go through; the caller is already exiting
    Proceed,
    /// The close was cancelled and the user must confirm
    AskUser,
}

#[derive(Debug, Default)]
pub struct CloseNegotiator {
    forced: bool,
    next_token: u64,
    outstanding: BTreeSet<TransitionToken>,
    terminating: bool,
    prompt_open: bool,
}

impl CloseNegotiator {
    pub fn new(forced: bool) -> Self {
        Self {
            forced,
            ..Self::default()
        }
    }

    pub fn guard(&self) -> CloseGuard {
        if self.forced || !self.outstanding.is_empty() {
            CloseGuard::Ignore
        } else if self.terminating {
            CloseGuard::AllowSilently
        } else {
            CloseGuard::AskUser
        }
    }

    /// Engage the ignore guard for a transition about to happen
    pub fn begin_transition(&mut self) -> TransitionToken {
        self.next_token += 1;
        let token = TransitionToken(self.next_token);
        self.outstanding.insert(token);
        debug!("Close guard engaged for transition {}", token.0);
        token
    }

    /// Retire a transition token. Returns false for unknown or already
    /// retired tokens.
    pub fn settle(&mut self, token: TransitionToken) -> bool {
        let removed = self.outstanding.remove(&token);
        if removed {
            debug!(
                "Transition {} settled, {} still outstanding",
                token.0,
                self.outstanding.len()
            );
        }
        removed
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Mark that a terminal exit path has been taken
    pub fn allow_silently(&mut self) {
        self.terminating = true;
    }

    pub fn is_prompt_open(&self) -> bool {
        self.prompt_open
    }

    pub fn request_close(&mut self) -> CloseDecision {
        match self.guard() {
            CloseGuard::Ignore => CloseDecision::Suppressed,
            CloseGuard::AllowSilently => CloseDecision::Proceed,
            // One confirmation at a time
            CloseGuard::AskUser if self.prompt_open => CloseDecision::Suppressed,
            CloseGuard::AskUser => {
                self.prompt_open = true;
                CloseDecision::AskUser
            }
        }
    }

    /// Close the confirmation prompt. Returns true when the countdown must be
    /// cancelled.
    pub fn resolve_prompt(&mut self, confirmed: bool) -> bool {
        if !self.prompt_open {
            return false;
        }
        self.prompt_open = false;
        confirmed && !self.terminating && !self.forced
    }
}
