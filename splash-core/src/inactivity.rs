//! Inactivity countdown state machine
//!
//! After every activation the board waits for a grace period. If nothing
//! happens a visible countdown starts, and once it has run out the board is
//! recolored and the wait starts over.

use crate::scheduler::TimerQueue;
use std::time::{Duration, Instant};
use tracing::debug;

/// Quiet period after an activation before the countdown appears
pub const GRACE_PERIOD: Duration = Duration::from_secs(10);
/// Length of the visible countdown, in seconds
pub const COUNTDOWN_SECS: u8 = 10;
/// Delay between entering the countdown and the forced recolor
pub const FORCED_ACTION_DELAY: Duration = Duration::from_secs(10);

const TICK: Duration = Duration::from_secs(1);

/// Current phase of the inactivity timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    /// No countdown running
    #[default]
    Idle,
    /// Grace period after activity, nothing visible
    Waiting,
    /// Countdown visible, seconds remaining
    Warning(u8),
}

/// Side effects requested by the timer, applied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEffect {
    /// Show the countdown with this many seconds left
    ShowCountdown(u8),
    /// Hide the countdown display
    HideCountdown,
    /// Pick a new background color
    RandomizeBackground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fire {
    GraceElapsed,
    Tick,
    ForcedAction,
}

/// Inactivity timer driven by a `TimerQueue`
pub struct InactivityTimer {
    state: TimerState,
    timers: TimerQueue<Fire>,
}

impl InactivityTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            timers: TimerQueue::new(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Seconds shown on the countdown, if it is visible
    pub fn countdown(&self) -> Option<u8> {
        match self.state {
            TimerState::Warning(n) => Some(n),
            _ => None,
        }
    }

    /// Earliest instant at which `poll` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn restart(&mut self, now: Instant) {
        self.timers.cancel_all();
        self.state = TimerState::Waiting;
        self.timers.schedule_after(now, GRACE_PERIOD, Fire::GraceElapsed);
    }

    /// Record user activity: cancel everything and start a fresh grace period
    pub fn activity(&mut self, now: Instant) -> TimerEffect {
        debug!(previous = ?self.state, "inactivity timer reset");
        self.restart(now);
        TimerEffect::HideCountdown
    }

    /// The board became hidden: stop all timers
    pub fn suspend(&mut self) -> TimerEffect {
        debug!("inactivity timer suspended");
        self.timers.cancel_all();
        self.state = TimerState::Idle;
        TimerEffect::HideCountdown
    }

    /// The board became visible again
    pub fn resume(&mut self, now: Instant) -> TimerEffect {
        self.activity(now)
    }

    /// Fire every timer due at or before `now`, in order.
    ///
    /// Follow-up timers are scheduled from the deadline that fired rather
    /// than from `now`, so a late poll still produces the full sequence.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerEffect> {
        let mut effects = Vec::new();

        while let Some(due) = self.timers.pop_due(now) {
            match due.payload {
                Fire::GraceElapsed => {
                    self.state = TimerState::Warning(COUNTDOWN_SECS);
                    self.timers.schedule_repeating(due.at, TICK, Fire::Tick);
                    self.timers
                        .schedule_after(due.at, FORCED_ACTION_DELAY, Fire::ForcedAction);
                    debug!("countdown started");
                    effects.push(TimerEffect::ShowCountdown(COUNTDOWN_SECS));
                }
                Fire::Tick => {
                    let left = match self.state {
                        TimerState::Warning(n) => n.saturating_sub(1),
                        _ => 0,
                    };
                    if left == 0 {
                        self.timers.cancel(due.id);
                        self.state = TimerState::Idle;
                        effects.push(TimerEffect::HideCountdown);
                    } else {
                        self.state = TimerState::Warning(left);
                        effects.push(TimerEffect::ShowCountdown(left));
                    }
                }
                Fire::ForcedAction => {
                    debug!("inactivity expired, recoloring");
                    effects.push(TimerEffect::RandomizeBackground);
                    effects.push(TimerEffect::HideCountdown);
                    self.restart(due.at);
                }
            }
        }

        effects
    }
}

impl Default for InactivityTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(t0: Instant, s: u64) -> Instant {
        t0 + Duration::from_secs(s)
    }

    #[test]
    fn test_activity_enters_waiting() {
        let t0 = Instant::now();
        let mut timer = InactivityTimer::new();
        assert_eq!(timer.state(), TimerState::Idle);

        assert_eq!(timer.activity(t0), TimerEffect::HideCountdown);
        assert_eq!(timer.state(), TimerState::Waiting);
        assert_eq!(timer.next_deadline(), Some(secs(t0, 10)));
        assert!(timer.poll(secs(t0, 9)).is_empty());
    }

    #[test]
    fn test_full_countdown_second_by_second() {
        let t0 = Instant::now();
        let mut timer = InactivityTimer::new();
        timer.activity(t0);

        assert_eq!(timer.poll(secs(t0, 10)), vec![TimerEffect::ShowCountdown(10)]);
        assert_eq!(timer.countdown(), Some(10));

        for s in 11..20 {
            let expected = (20 - s) as u8;
            assert_eq!(timer.poll(secs(t0, s)), vec![TimerEffect::ShowCountdown(expected)]);
            assert_eq!(timer.state(), TimerState::Warning(expected));
        }

        let effects = timer.poll(secs(t0, 20));
        assert_eq!(
            effects,
            vec![
                TimerEffect::HideCountdown,
                TimerEffect::RandomizeBackground,
                TimerEffect::HideCountdown,
            ]
        );
        let recolors = effects
            .iter()
            .filter(|e| **e == TimerEffect::RandomizeBackground)
            .count();
        assert_eq!(recolors, 1);

        // Forced action restarts the grace period
        assert_eq!(timer.state(), TimerState::Waiting);
        assert_eq!(timer.next_deadline(), Some(secs(t0, 30)));
    }

    #[test]
    fn test_late_poll_replays_sequence() {
        let t0 = Instant::now();
        let mut timer = InactivityTimer::new();
        timer.activity(t0);

        let effects = timer.poll(secs(t0, 20));
        assert_eq!(effects.first(), Some(&TimerEffect::ShowCountdown(10)));
        assert_eq!(
            effects
                .iter()
                .filter(|e| **e == TimerEffect::RandomizeBackground)
                .count(),
            1
        );
        assert_eq!(timer.state(), TimerState::Waiting);
    }

    #[test]
    fn test_activity_during_countdown_cancels_it() {
        let t0 = Instant::now();
        let mut timer = InactivityTimer::new();
        timer.activity(t0);
        timer.poll(secs(t0, 15));
        assert_eq!(timer.state(), TimerState::Warning(5));

        timer.activity(secs(t0, 15));
        assert_eq!(timer.state(), TimerState::Waiting);
        // Old forced action at 20s must not fire
        assert!(timer.poll(secs(t0, 24)).is_empty());
        assert_eq!(timer.poll(secs(t0, 25)), vec![TimerEffect::ShowCountdown(10)]);
    }

    #[test]
    fn test_suspend_and_resume() {
        let t0 = Instant::now();
        let mut timer = InactivityTimer::new();
        timer.activity(t0);
        timer.poll(secs(t0, 12));

        assert_eq!(timer.suspend(), TimerEffect::HideCountdown);
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.next_deadline().is_none());
        assert!(timer.poll(secs(t0, 100)).is_empty());

        timer.resume(secs(t0, 100));
        assert_eq!(timer.state(), TimerState::Waiting);
        assert_eq!(timer.next_deadline(), Some(secs(t0, 110)));
    }
}
