//! Cancellable timer queue
//!
//! Every delayed or repeating action in Splash (hold detection, the idle
//! grace period, countdown ticks) is an entry in a `TimerQueue`. Entries are
//! addressed by the `TimerId` returned at scheduling time, so a caller that
//! replaces a timer can always cancel the old one first.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Entry<T> {
    payload: T,
    /// Re-arm interval for repeating timers
    period: Option<Duration>,
}

/// A timer that came due
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Due<T> {
    pub id: TimerId,
    /// Deadline the timer was scheduled for (not the poll time)
    pub at: Instant,
    pub payload: T,
}

/// A queue of pending timers ordered by deadline.
///
/// Timers due at the same instant fire in the order they were created.
/// A repeating timer keeps its creation order when re-armed.
pub struct TimerQueue<T> {
    /// (deadline, id) -> entry
    pending: BTreeMap<(Instant, TimerId), Entry<T>>,
    /// id -> current deadline
    deadlines: HashMap<TimerId, Instant>,
    next_id: u64,
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }

    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, at: Instant, period: Option<Duration>, payload: T) -> TimerId {
        let id = self.allocate_id();
        self.pending.insert((at, id), Entry { payload, period });
        self.deadlines.insert(id, at);
        id
    }

    /// Schedule a one-shot timer firing at `at`
    pub fn schedule_at(&mut self, at: Instant, payload: T) -> TimerId {
        self.insert(at, None, payload)
    }

    /// Schedule a one-shot timer firing `delay` after `now`
    pub fn schedule_after(&mut self, now: Instant, delay: Duration, payload: T) -> TimerId {
        self.insert(now + delay, None, payload)
    }

    /// Schedule a timer firing every `period`, first at `now + period`
    pub fn schedule_repeating(&mut self, now: Instant, period: Duration, payload: T) -> TimerId {
        self.insert(now + period, Some(period), payload)
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(at) => self.pending.remove(&(at, id)).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }

    /// Whether the timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.keys().next().map(|(at, _)| *at)
    }

    /// Pop the earliest timer due at or before `now`.
    ///
    /// Pops one timer at a time so the caller can cancel or schedule other
    /// timers in reaction before the next one is considered. Repeating
    /// timers are re-armed at `deadline + period` under the same id.
    pub fn pop_due(&mut self, now: Instant) -> Option<Due<T>> {
        let key = *self.pending.keys().next()?;
        if key.0 > now {
            return None;
        }

        let entry = self.pending.remove(&key)?;
        let (at, id) = key;

        match entry.period {
            Some(period) => {
                let next = at + period;
                let payload = entry.payload.clone();
                self.pending.insert((next, id), entry);
                self.deadlines.insert(id, next);
                Some(Due { id, at, payload })
            }
            None => {
                self.deadlines.remove(&id);
                Some(Due {
                    id,
                    at,
                    payload: entry.payload,
                })
            }
        }
    }
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule_after(t0, Duration::from_secs(2), "late");
        queue.schedule_after(t0, Duration::from_secs(1), "early");

        assert!(queue.pop_due(t0).is_none());

        let now = t0 + Duration::from_secs(5);
        assert_eq!(queue.pop_due(now).map(|due| due.payload), Some("early"));
        assert_eq!(queue.pop_due(now).map(|due| due.payload), Some("late"));
        assert!(queue.pop_due(now).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_same_deadline_fires_in_creation_order() {
        let t0 = Instant::now();
        let at = t0 + Duration::from_secs(1);
        let mut queue = TimerQueue::new();
        queue.schedule_at(at, 1);
        queue.schedule_at(at, 2);
        queue.schedule_at(at, 3);

        let fired: Vec<i32> =
            std::iter::from_fn(|| queue.pop_due(at).map(|due| due.payload)).collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let id = queue.schedule_after(t0, Duration::from_millis(300), ());

        assert!(queue.is_pending(id));
        assert!(queue.cancel(id));
        assert!(!queue.is_pending(id));
        assert!(!queue.cancel(id));
        assert!(queue.pop_due(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_repeating_keeps_creation_order() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let tick = queue.schedule_repeating(t0, Duration::from_secs(1), "tick");
        let _deadline = queue.schedule_after(t0, Duration::from_secs(3), "deadline");

        let now = t0 + Duration::from_secs(3);
        let fired: Vec<&str> =
            std::iter::from_fn(|| queue.pop_due(now).map(|due| due.payload)).collect();
        // The tick at 3s was created before the deadline, so it fires first
        assert_eq!(fired, vec!["tick", "tick", "tick", "deadline"]);

        assert!(queue.is_pending(tick));
        assert_eq!(queue.next_deadline(), Some(t0 + Duration::from_secs(4)));
    }

    #[test]
    fn test_cancel_all() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule_after(t0, Duration::from_secs(1), 'a');
        queue.schedule_repeating(t0, Duration::from_secs(1), 'b');
        queue.cancel_all();

        assert_eq!(queue.len(), 0);
        assert!(queue.next_deadline().is_none());
    }
}
