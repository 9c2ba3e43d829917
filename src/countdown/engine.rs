//! Countdown engine: elapsed-time tracking, expiry and dispatch

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{
    clock::{Stopwatch, TimeSource},
    collaborators::{Frame, Notice, Notifier, PowerDispatcher, SleepGuard, Surface},
    milestones::MilestoneTracker,
    LEAD_IN,
};
use crate::{
    config::CountdownConfig,
    state::{Phase, VisibilityMode},
};

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine is not running; nothing happened
    Idle,
    Running { remaining: Duration },
    /// The countdown ran out and the action was dispatched
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shown {
    remaining: Duration,
    seconds: u64,
    mode: VisibilityMode,
}

/// Mutable countdown state, owned by the engine
#[derive(Debug)]
pub struct CountdownState {
    stopwatch: Stopwatch,
    phase: Phase,
    last_shown: Option<Shown>,
    started_at: Option<DateTime<Utc>>,
}

impl CountdownState {
    fn new(clock: Box<dyn TimeSource>) -> Self {
        Self {
            stopwatch: Stopwatch::new(clock),
            phase: Phase::Idle,
            last_shown: None,
            started_at: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }
}

pub struct CountdownEngine {
    config: CountdownConfig,
    state: CountdownState,
    milestones: MilestoneTracker,
    dispatcher: Box<dyn PowerDispatcher>,
    sleep_guard: Box<dyn SleepGuard>,
    awake_held: bool,
}

impl CountdownEngine {
    pub fn new(
        config: CountdownConfig,
        clock: Box<dyn TimeSource>,
        dispatcher: Box<dyn PowerDispatcher>,
        sleep_guard: Box<dyn SleepGuard>,
    ) -> Self {
        Self {
            config,
            state: CountdownState::new(clock),
            milestones: MilestoneTracker::new(),
            dispatcher,
            sleep_guard,
            awake_held: false,
        }
    }

    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &CountdownState {
        &self.state
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.state.started_at
    }

    /// Start counting down. Only the first call has any effect.
    pub fn start(&mut self, mode: VisibilityMode, surface: &mut dyn Surface) -> bool {
        if self.state.phase != Phase::Idle {
            warn!("Countdown already started, ignoring start request");
            return false;
        }

        self.arm(mode, surface);
        info!(
            "Countdown started: {} in {}s (graceful={})",
            self.config.action,
            self.config.duration.as_secs(),
            self.config.graceful
        );

        if self.config.prevent_sleep && !self.awake_held {
            self.sleep_guard.assert();
            self.awake_held = true;
        }
        true
    }

    /// Re-evaluate the remaining time; terminal once it reaches zero
    pub fn on_tick(
        &mut self,
        mode: VisibilityMode,
        surface: &mut dyn Surface,
        notifier: &mut dyn Notifier,
    ) -> TickOutcome {
        if self.state.phase != Phase::Running {
            return TickOutcome::Idle;
        }

        let remaining = self.remaining();
        self.refresh(mode, surface, remaining);

        let seconds = remaining.as_secs();
        if let Some(mark) = self.milestones.observe(seconds) {
            notifier.notify(Notice::Milestone { mark, remaining });
        }

        if seconds == 0 {
            self.expire();
            return TickOutcome::Expired;
        }

        TickOutcome::Running { remaining }
    }

    /// Reset to the full duration and keep running. Configuration and the
    /// keep-awake request are left as they are.
    pub fn restart(&mut self, mode: VisibilityMode, surface: &mut dyn Surface) -> bool {
        if self.state.phase != Phase::Running {
            warn!("Countdown is {:?}, cannot restart timer", self.state.phase);
            return false;
        }

        self.arm(mode, surface);
        info!("Countdown restarted at {}s", self.config.duration.as_secs());
        true
    }

    /// Stop for good after the user confirmed a close request
    pub fn cancel(&mut self, notifier: &mut dyn Notifier) -> bool {
        if self.state.phase != Phase::Running {
            return false;
        }

        self.state.stopwatch.stop();
        self.state.phase = Phase::Cancelled;
        self.release_sleep_guard();
        info!("Countdown cancelled, {} will not run", self.config.action);
        notifier.notify(Notice::Cancelled {
            action: self.config.action,
        });
        true
    }

    /// Stop because the application is exiting or restarting
    pub fn halt(&mut self) {
        self.state.stopwatch.stop();
        if !self.state.phase.is_terminal() {
            self.state.phase = Phase::Stopped;
        }
        self.release_sleep_guard();
    }

    /// Remaining time including the lead-in second, never above the
    /// configured duration
    pub fn remaining(&self) -> Duration {
        match self.state.phase {
            Phase::Idle => self.config.duration,
            Phase::Expired => Duration::ZERO,
            _ => self
                .config
                .duration
                .saturating_add(LEAD_IN)
                .saturating_sub(self.state.elapsed())
                .min(self.config.duration),
        }
    }

    /// Remaining time as last rendered
    pub fn displayed_remaining(&self) -> Duration {
        self.state
            .last_shown
            .map(|shown| shown.remaining)
            .unwrap_or_else(|| self.remaining())
    }

    /// Render the current remaining time if it changed since the last refresh
    pub fn refresh_now(&mut self, mode: VisibilityMode, surface: &mut dyn Surface) -> bool {
        let remaining = self.remaining();
        self.refresh(mode, surface, remaining)
    }

    fn arm(&mut self, mode: VisibilityMode, surface: &mut dyn Surface) {
        self.state.stopwatch.reset();
        self.state.stopwatch.start();
        self.state.phase = Phase::Running;
        self.state.started_at = Some(Utc::now());
        self.state.last_shown = None;

        self.milestones.rearm();
        self.milestones.observe(self.config.duration.as_secs());
        self.refresh(mode, surface, self.config.duration);
    }

    fn refresh(&mut self, mode: VisibilityMode, surface: &mut dyn Surface, remaining: Duration) -> bool {
        let seconds = remaining.as_secs();
        if let Some(shown) = self.state.last_shown {
            if shown.seconds == seconds && shown.mode == mode {
                return false;
            }
        }

        surface.refresh(&Frame {
            remaining,
            mode,
            action: self.config.action,
            annotation: self.config.annotation.as_deref(),
        });
        self.state.last_shown = Some(Shown { remaining, seconds, mode });
        true
    }

    fn expire(&mut self) {
        self.state.stopwatch.stop();
        self.state.phase = Phase::Expired;
        info!(
            "Countdown expired after {:?}, executing {}",
            self.state.elapsed(),
            self.config.action
        );

        // Released first so our own lock is gone before logind sees the request
        self.release_sleep_guard();
        self.dispatcher.dispatch(self.config.action, self.config.graceful);
    }

    fn release_sleep_guard(&mut self) {
        if self.awake_held {
            self.sleep_guard.clear();
            self.awake_held = false;
            debug!("Keep-awake request released");
        }
    }
}

impl std::fmt::Debug for CountdownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("awake_held", &self.awake_held)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        countdown::{clock::ManualClock, fakes::Recorder, milestones::Milestone},
        state::PowerAction,
    };

    type Fake = Recorder;

    const TICK: Duration = Duration::from_millis(100);
    const FG: VisibilityMode = VisibilityMode::Foreground;

    fn engine(config: CountdownConfig) -> (CountdownEngine, ManualClock, Fake) {
        let clock = ManualClock::new();
        let fake = Fake::default();
        let engine = CountdownEngine::new(
            config,
            Box::new(clock.clone()),
            Box::new(fake.clone()),
            Box::new(fake.clone()),
        );
        (engine, clock, fake)
    }

    /// Tick every 100ms until expiry; returns the number of ticks
    fn run_to_expiry(engine: &mut CountdownEngine, clock: &ManualClock, fake: &Fake) -> usize {
        let mut surface = fake.clone();
        let mut notifier = fake.clone();
        for ticks in 1..=100_000 {
            clock.advance(TICK);
            if engine.on_tick(FG, &mut surface, &mut notifier) == TickOutcome::Expired {
                return ticks;
            }
        }
        panic!("countdown never expired");
    }

    #[test]
    fn five_second_countdown_shows_each_second_and_dispatches_once() {
        let config = CountdownConfig::new(Duration::from_secs(5), PowerAction::Shutdown);
        let (mut engine, clock, fake) = engine(config);
        let mut surface = fake.clone();
        let mut notifier = fake.clone();

        assert!(engine.start(FG, &mut surface));
        let ticks = run_to_expiry(&mut engine, &clock, &fake);

        // Expiry lands on the first tick after D
        assert_eq!(ticks, 51);

        let log = fake.log();
        let seconds: Vec<u64> = log.frames.iter().map(|(s, _)| *s).collect();
        assert_eq!(seconds, vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(log.dispatched, vec![(PowerAction::Shutdown, true)]);
        drop(log);

        // Terminal: further ticks do nothing
        clock.advance(Duration::from_secs(10));
        assert_eq!(engine.on_tick(FG, &mut surface, &mut notifier), TickOutcome::Idle);
        assert_eq!(fake.log().dispatched.len(), 1);
        assert_eq!(engine.phase(), Phase::Expired);
    }

    #[test]
    fn dispatch_uses_configured_graceful_flag() {
        let mut config = CountdownConfig::new(Duration::from_secs(2), PowerAction::Logout);
        config.graceful = false;
        let (mut engine, clock, fake) = engine(config);
        engine.start(FG, &mut fake.clone());
        run_to_expiry(&mut engine, &clock, &fake);

        assert_eq!(fake.log().dispatched, vec![(PowerAction::Logout, false)]);
    }

    #[test]
    fn zero_duration_expires_on_first_tick() {
        let config = CountdownConfig::new(Duration::ZERO, PowerAction::Lock);
        let (mut engine, clock, fake) = engine(config);
        engine.start(FG, &mut fake.clone());

        assert_eq!(run_to_expiry(&mut engine, &clock, &fake), 1);
    }

    #[test]
    fn restart_resets_elapsed_and_remaining() {
        let config = CountdownConfig::new(Duration::from_secs(10), PowerAction::Sleep);
        let (mut engine, clock, fake) = engine(config);
        let mut surface = fake.clone();
        let mut notifier = fake.clone();
        engine.start(FG, &mut surface);

        for _ in 0..70 {
            clock.advance(TICK);
            engine.on_tick(FG, &mut surface, &mut notifier);
        }
        assert_eq!(engine.remaining().as_secs(), 4);

        assert!(engine.restart(FG, &mut surface));
        assert_eq!(engine.state().elapsed(), Duration::ZERO);
        assert_eq!(engine.remaining(), Duration::from_secs(10));
        assert_eq!(fake.log().frames.last(), Some(&(10, FG)));

        // Expires a full D after the restart
        assert_eq!(run_to_expiry(&mut engine, &clock, &fake), 101);
        assert_eq!(fake.log().dispatched.len(), 1);
    }

    #[test]
    fn sleep_guard_asserted_once_and_cleared_once() {
        let mut config = CountdownConfig::new(Duration::from_secs(3), PowerAction::Hibernate);
        config.prevent_sleep = true;
        let (mut engine, clock, fake) = engine(config);
        let mut surface = fake.clone();

        engine.start(FG, &mut surface);
        assert!(!engine.start(FG, &mut surface));
        engine.restart(FG, &mut surface);
        run_to_expiry(&mut engine, &clock, &fake);
        engine.halt();

        let log = fake.log();
        assert_eq!(log.asserted, 1);
        assert_eq!(log.cleared, 1);
        assert_eq!(log.guard_held_at_dispatch, vec![false]);
    }

    #[test]
    fn huge_duration_ticks_without_overflow() {
        let config = CountdownConfig::new(Duration::MAX, PowerAction::Shutdown);
        let (mut engine, clock, fake) = engine(config);
        let mut surface = fake.clone();
        let mut notifier = fake.clone();
        engine.start(FG, &mut surface);

        clock.advance(TICK);
        assert_eq!(
            engine.on_tick(FG, &mut surface, &mut notifier),
            TickOutcome::Running {
                remaining: Duration::MAX - TICK
            }
        );
        assert!(fake.log().dispatched.is_empty());
    }

    #[test]
    fn sleep_guard_untouched_when_not_configured() {
        let config = CountdownConfig::new(Duration::from_secs(1), PowerAction::Shutdown);
        let (mut engine, clock, fake) = engine(config);
        engine.start(FG, &mut fake.clone());
        run_to_expiry(&mut engine, &clock, &fake);

        let log = fake.log();
        assert_eq!((log.asserted, log.cleared), (0, 0));
    }

    #[test]
    fn cancel_clears_guard_and_never_dispatches() {
        let mut config = CountdownConfig::new(Duration::from_secs(60), PowerAction::Restart);
        config.prevent_sleep = true;
        let (mut engine, clock, fake) = engine(config);
        let mut surface = fake.clone();
        let mut notifier = fake.clone();
        engine.start(FG, &mut surface);

        assert!(engine.cancel(&mut notifier));
        assert!(!engine.cancel(&mut notifier));
        clock.advance(Duration::from_secs(120));
        assert_eq!(engine.on_tick(FG, &mut surface, &mut notifier), TickOutcome::Idle);

        let log = fake.log();
        assert!(log.dispatched.is_empty());
        assert_eq!(log.cleared, 1);
        assert_eq!(
            log.notices,
            vec![Notice::Cancelled {
                action: PowerAction::Restart
            }]
        );
        assert_eq!(engine.phase(), Phase::Cancelled);
    }

    #[test]
    fn refresh_only_on_new_second_or_mode_change() {
        let config = CountdownConfig::new(Duration::from_secs(30), PowerAction::Shutdown);
        let (mut engine, clock, fake) = engine(config);
        let mut surface = fake.clone();
        engine.start(FG, &mut surface);

        clock.advance(Duration::from_millis(300));
        assert!(!engine.refresh_now(FG, &mut surface));
        assert!(engine.refresh_now(VisibilityMode::Background, &mut surface));
        clock.advance(Duration::from_millis(800));
        assert!(engine.refresh_now(VisibilityMode::Background, &mut surface));

        let log = fake.log();
        assert_eq!(
            log.frames,
            vec![(30, FG), (30, VisibilityMode::Background), (29, VisibilityMode::Background)]
        );
    }

    #[test]
    fn milestones_fire_while_counting_down() {
        let config = CountdownConfig::new(Duration::from_secs(32), PowerAction::Shutdown);
        let (mut engine, clock, fake) = engine(config);
        engine.start(FG, &mut fake.clone());
        run_to_expiry(&mut engine, &clock, &fake);

        let log = fake.log();
        let marks: Vec<Milestone> = log
            .notices
            .iter()
            .filter_map(|n| match n {
                Notice::Milestone { mark, .. } => Some(*mark),
                _ => None,
            })
            .collect();
        assert_eq!(marks, vec![Milestone::ThirtySeconds]);
    }
}
