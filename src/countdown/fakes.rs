//! Recording collaborators for tests

use std::sync::{Arc, Mutex, MutexGuard};

use super::collaborators::{Frame, Notice, Notifier, PowerDispatcher, SleepGuard, Surface};
use crate::state::{PowerAction, VisibilityMode, WindowFlags, WindowState};

#[derive(Debug)]
pub struct Log {
    pub dispatched: Vec<(PowerAction, bool)>,
    pub asserted: usize,
    pub cleared: usize,
    /// Whether the sleep guard was still held at each dispatch
    pub guard_held_at_dispatch: Vec<bool>,
    pub frames: Vec<(u64, VisibilityMode)>,
    pub applied: Vec<WindowFlags>,
    pub notices: Vec<Notice>,
    pub window: WindowState,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            dispatched: Vec::new(),
            asserted: 0,
            cleared: 0,
            guard_held_at_dispatch: Vec::new(),
            frames: Vec::new(),
            applied: Vec::new(),
            notices: Vec::new(),
            window: WindowState::Normal,
        }
    }
}

/// Implements every collaborator trait against one shared log
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Log>>);

impl Recorder {
    pub fn log(&self) -> MutexGuard<'_, Log> {
        self.0.lock().unwrap()
    }

    /// Simulate the user minimizing or restoring the window
    pub fn set_window(&self, state: WindowState) {
        self.log().window = state;
    }

    pub fn seconds_shown(&self) -> Vec<u64> {
        self.log().frames.iter().map(|(s, _)| *s).collect()
    }
}

impl PowerDispatcher for Recorder {
    fn dispatch(&mut self, action: PowerAction, graceful: bool) {
        let mut log = self.log();
        let held = log.asserted > log.cleared;
        log.guard_held_at_dispatch.push(held);
        log.dispatched.push((action, graceful));
    }
}

impl SleepGuard for Recorder {
    fn assert(&mut self) {
        self.log().asserted += 1;
    }

    fn clear(&mut self) {
        self.log().cleared += 1;
    }
}

impl Surface for Recorder {
    fn refresh(&mut self, frame: &Frame<'_>) {
        self.log().frames.push((frame.remaining.as_secs(), frame.mode));
    }

    fn apply(&mut self, flags: &WindowFlags) {
        let mut log = self.log();
        log.window = flags.window_state();
        log.applied.push(*flags);
    }

    fn observe(&self) -> WindowState {
        self.0.lock().unwrap().window
    }
}

impl Notifier for Recorder {
    fn notify(&mut self, notice: Notice) {
        self.log().notices.push(notice);
    }
}
