//! One countdown run: engine, visibility and close negotiation together

use tracing::{debug, info, warn};

use super::{
    close::{CloseDecision, CloseGuard, CloseNegotiator, TransitionToken},
    collaborators::{Collaborators, Notice, Notifier, Surface},
    engine::{CountdownEngine, TickOutcome},
    visibility::{Transition, VisibilityController},
};
use crate::{
    config::CountdownConfig,
    state::{format_remaining, Phase, Status, VisibilityMode},
};

/// What the control loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Terminate the process
    Exit,
    /// Re-execute the process, then terminate
    Restart,
}

impl Flow {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Owns every piece of countdown state. Driven from a single control thread.
pub struct Session {
    engine: CountdownEngine,
    visibility: VisibilityController,
    negotiator: CloseNegotiator,
    surface: Box<dyn Surface>,
    notifier: Box<dyn Notifier>,
    unsettled: Vec<TransitionToken>,
}

impl Session {
    pub fn new(config: CountdownConfig, collaborators: Collaborators) -> Self {
        let visibility =
            VisibilityController::new(config.initially_visible, config.on_top, config.forced);
        let negotiator = CloseNegotiator::new(config.forced);
        let engine = CountdownEngine::new(
            config,
            collaborators.clock,
            collaborators.dispatcher,
            collaborators.sleep_guard,
        );

        Self {
            engine,
            visibility,
            negotiator,
            surface: collaborators.surface,
            notifier: collaborators.notifier,
            unsettled: Vec::new(),
        }
    }

    pub fn config(&self) -> &CountdownConfig {
        self.engine.config()
    }

    pub fn mode(&self) -> VisibilityMode {
        self.visibility.mode()
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn guard(&self) -> CloseGuard {
        self.negotiator.guard()
    }

    /// Apply the initial window flags and start counting down
    pub fn start(&mut self) {
        let token = self
            .visibility
            .apply_initial(self.surface.as_mut(), &mut self.negotiator);
        self.unsettled.push(token);
        self.engine.start(self.visibility.mode(), self.surface.as_mut());
    }

    /// One ~100ms tick: countdown first, then window reconciliation
    pub fn tick(&mut self) -> Flow {
        match self.engine.on_tick(
            self.visibility.mode(),
            self.surface.as_mut(),
            self.notifier.as_mut(),
        ) {
            TickOutcome::Expired => {
                self.negotiator.allow_silently();
                return Flow::Exit;
            }
            TickOutcome::Idle => return Flow::Continue,
            TickOutcome::Running { .. } => {}
        }

        let observed = self.surface.observe();
        if let Some(transition) =
            self.visibility
                .reconcile(observed, self.surface.as_mut(), &mut self.negotiator)
        {
            self.after_transition(transition);
        }
        Flow::Continue
    }

    /// Go to the tray. Returns false if already hidden.
    pub fn hide(&mut self) -> bool {
        match self.visibility.hide(self.surface.as_mut(), &mut self.negotiator) {
            Some(transition) => {
                self.after_transition(transition);
                true
            }
            None => false,
        }
    }

    /// Come back from the tray. Returns false if already shown.
    pub fn show(&mut self) -> bool {
        match self.visibility.show(self.surface.as_mut(), &mut self.negotiator) {
            Some(transition) => {
                self.after_transition(transition);
                true
            }
            None => false,
        }
    }

    /// Reset the countdown to its full duration
    pub fn restart_timer(&mut self) -> bool {
        if self.config().forced {
            warn!("Timer restart refused in forced mode");
            return false;
        }
        self.engine
            .restart(self.visibility.mode(), self.surface.as_mut())
    }

    pub fn request_close(&mut self) -> CloseDecision {
        let decision = self.negotiator.request_close();
        match decision {
            CloseDecision::Suppressed => debug!("Close request suppressed ({:?})", self.guard()),
            CloseDecision::Proceed => debug!("Close request allowed, exit already under way"),
            CloseDecision::AskUser => info!("Close requested, asking for confirmation"),
        }
        decision
    }

    /// Question shown by the confirmation prompt
    pub fn close_question(&self) -> String {
        format!(
            "{} in {}. Cancel it and exit? [y/N]",
            self.config().action,
            format_remaining(self.engine.displayed_remaining())
        )
    }

    /// Apply the user's answer to the confirmation prompt
    pub fn resolve_close(&mut self, confirmed: bool) -> Flow {
        if !self.negotiator.resolve_prompt(confirmed) {
            debug!("Close not confirmed, countdown continues");
            return Flow::Continue;
        }
        if !self.engine.cancel(self.notifier.as_mut()) {
            return Flow::Continue;
        }
        self.exit_application()
    }

    /// Retire the close guard of a finished transition
    pub fn settle(&mut self, token: TransitionToken) -> bool {
        self.negotiator.settle(token)
    }

    /// Tokens whose deferred release has not been scheduled yet
    pub fn take_unsettled(&mut self) -> Vec<TransitionToken> {
        std::mem::take(&mut self.unsettled)
    }

    pub fn exit_application(&mut self) -> Flow {
        self.negotiator.allow_silently();
        self.engine.halt();
        info!("Exiting application");
        Flow::Exit
    }

    pub fn restart_application(&mut self) -> Flow {
        if self.config().forced {
            warn!("Application restart refused in forced mode");
            return Flow::Continue;
        }
        self.negotiator.allow_silently();
        self.engine.halt();
        info!("Restarting application");
        Flow::Restart
    }

    pub fn status(&self) -> Status {
        let config = self.engine.config();
        let remaining = self.engine.displayed_remaining();
        Status {
            phase: self.engine.phase(),
            remaining_seconds: remaining.as_secs(),
            remaining: format_remaining(remaining),
            mode: self.visibility.mode(),
            action: config.action,
            graceful: config.graceful,
            forced: config.forced,
            annotation: config.annotation.clone(),
            started_at: self.engine.started_at(),
        }
    }

    fn after_transition(&mut self, transition: Transition) {
        self.unsettled.push(transition.token);
        if transition.to == VisibilityMode::Background {
            self.notifier.notify(Notice::Backgrounded {
                remaining: self.engine.remaining(),
            });
        }
        self.engine.refresh_now(transition.to, self.surface.as_mut());
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine)
            .field("visibility", &self.visibility)
            .field("negotiator", &self.negotiator)
            .field("unsettled", &self.unsettled)
            .finish()
    }
}
