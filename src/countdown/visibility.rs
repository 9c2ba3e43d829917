//! Foreground/background mode state machine

use tracing::{debug, info};

use super::{
    close::{CloseNegotiator, TransitionToken},
    collaborators::Surface,
};
use crate::state::{VisibilityMode, WindowFlags, WindowState};

/// A completed mode change; the token must be settled later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: VisibilityMode,
    pub token: TransitionToken,
}

/// Owns the authoritative visibility mode.
///
/// External minimize/restore wins: when the observed window state disagrees
/// with the mode, the controller adopts the observed one.
#[derive(Debug)]
pub struct VisibilityController {
    mode: VisibilityMode,
    on_top: bool,
    forced: bool,
}

impl VisibilityController {
    pub fn new(initially_visible: bool, on_top: bool, forced: bool) -> Self {
        let mode = if initially_visible {
            VisibilityMode::Foreground
        } else {
            VisibilityMode::Background
        };
        Self { mode, on_top, forced }
    }

    pub fn mode(&self) -> VisibilityMode {
        self.mode
    }

    pub fn flags(&self) -> WindowFlags {
        WindowFlags::for_mode(self.mode, self.on_top, self.forced)
    }

    /// Apply the flags of the current mode without changing it
    pub fn apply_initial(
        &self,
        surface: &mut dyn Surface,
        negotiator: &mut CloseNegotiator,
    ) -> TransitionToken {
        let token = negotiator.begin_transition();
        surface.apply(&self.flags());
        debug!("Initial visibility mode: {:?}", self.mode);
        token
    }

    /// Foreground → Background
    pub fn hide(
        &mut self,
        surface: &mut dyn Surface,
        negotiator: &mut CloseNegotiator,
    ) -> Option<Transition> {
        self.transition(VisibilityMode::Background, surface, negotiator)
    }

    /// Background → Foreground
    pub fn show(
        &mut self,
        surface: &mut dyn Surface,
        negotiator: &mut CloseNegotiator,
    ) -> Option<Transition> {
        self.transition(VisibilityMode::Foreground, surface, negotiator)
    }

    /// Align the mode with what the platform reports
    pub fn reconcile(
        &mut self,
        observed: WindowState,
        surface: &mut dyn Surface,
        negotiator: &mut CloseNegotiator,
    ) -> Option<Transition> {
        match (self.mode, observed.is_minimized()) {
            (VisibilityMode::Background, false) => {
                debug!("Window restored externally, adopting foreground");
                self.show(surface, negotiator)
            }
            (VisibilityMode::Foreground, true) => {
                debug!("Window minimized externally, adopting background");
                self.hide(surface, negotiator)
            }
            _ => None,
        }
    }

    fn transition(
        &mut self,
        to: VisibilityMode,
        surface: &mut dyn Surface,
        negotiator: &mut CloseNegotiator,
    ) -> Option<Transition> {
        if self.mode == to {
            return None;
        }

        // The guard goes up before the platform sees the change
        let token = negotiator.begin_transition();
        self.mode = to;
        surface.apply(&self.flags());
        info!("Visibility mode changed to {:?}", to);

        Some(Transition { to, token })
    }
}
