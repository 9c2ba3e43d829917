//! Remaining-time milestones (2h, 1h, 30m, 5m, 30s)

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    TwoHours,
    OneHour,
    ThirtyMinutes,
    FiveMinutes,
    ThirtySeconds,
}

impl Milestone {
    /// Largest first
    pub const ALL: [Milestone; 5] = [
        Milestone::TwoHours,
        Milestone::OneHour,
        Milestone::ThirtyMinutes,
        Milestone::FiveMinutes,
        Milestone::ThirtySeconds,
    ];

    pub fn seconds(&self) -> u64 {
        match self {
            Self::TwoHours => 2 * 3600,
            Self::OneHour => 3600,
            Self::ThirtyMinutes => 30 * 60,
            Self::FiveMinutes => 5 * 60,
            Self::ThirtySeconds => 30,
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::TwoHours => "2 hours",
            Self::OneHour => "1 hour",
            Self::ThirtyMinutes => "30 minutes",
            Self::FiveMinutes => "5 minutes",
            Self::ThirtySeconds => "30 seconds",
        };
        f.write_str(text)
    }
}

/// Detects downward crossings of milestone marks between observations
#[derive(Debug, Default)]
pub struct MilestoneTracker {
    last_seconds: Option<u64>,
}

impl MilestoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous observation; the next one only sets the baseline
    pub fn rearm(&mut self) {
        self.last_seconds = None;
    }

    /// Record the remaining whole seconds and return the milestone crossed
    /// since the previous observation, if any.
    ///
    /// A mark is crossed when the previous value was above it and the new one
    /// is at or below it. When one observation jumps over several marks only
    /// the smallest is reported.
    pub fn observe(&mut self, remaining_seconds: u64) -> Option<Milestone> {
        let previous = self.last_seconds.replace(remaining_seconds)?;

        Milestone::ALL
            .iter()
            .rev()
            .find(|mark| previous > mark.seconds() && remaining_seconds <= mark.seconds())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_baseline() {
        let mut tracker = MilestoneTracker::new();
        assert_eq!(tracker.observe(30), None);
        assert_eq!(tracker.observe(29), None);
    }

    #[test]
    fn fires_once_per_crossing() {
        let mut tracker = MilestoneTracker::new();
        tracker.observe(302);
        assert_eq!(tracker.observe(301), None);
        assert_eq!(tracker.observe(300), Some(Milestone::FiveMinutes));
        assert_eq!(tracker.observe(300), None);
        assert_eq!(tracker.observe(299), None);
        assert_eq!(tracker.observe(31), None);
        assert_eq!(tracker.observe(30), Some(Milestone::ThirtySeconds));
        assert_eq!(tracker.observe(0), None);
    }

    #[test]
    fn jump_over_several_marks_reports_smallest() {
        let mut tracker = MilestoneTracker::new();
        tracker.observe(7300);
        assert_eq!(tracker.observe(1700), Some(Milestone::ThirtyMinutes));
    }

    #[test]
    fn rearm_allows_the_same_crossing_again() {
        let mut tracker = MilestoneTracker::new();
        tracker.observe(3601);
        assert_eq!(tracker.observe(3600), Some(Milestone::OneHour));

        tracker.rearm();
        tracker.observe(3601);
        assert_eq!(tracker.observe(3599), Some(Milestone::OneHour));
    }
}
