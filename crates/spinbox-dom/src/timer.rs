#![forbid(unsafe_code)]

//! Host-driven timer queue.
//!
//! Time only moves when the host calls [`Dom::advance`](crate::Dom::advance),
//! which makes every spin sequence reproducible in tests. The clock is an
//! offset from document creation, like a lab clock that is never read from
//! the wall.
//!
//! # Invariants
//!
//! 1. Timers fire in deadline order; equal deadlines fire in creation order.
//! 2. An interval is re-armed before its callback runs, so clearing it from
//!    inside the callback prevents every later firing.
//! 3. A cleared timer never fires, even if it was already due in the current
//!    `advance` call.
//!
//! # Failure Modes
//!
//! - **Zero period**: intervals are clamped to 1ms so `advance` always
//!   terminates.

use std::collections::BTreeMap;
use std::rc::Rc;

use web_time::Duration;

/// Handle returned by `set_timeout` / `set_interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

pub(crate) type TimerCallback = Rc<dyn Fn()>;

const MIN_PERIOD: Duration = Duration::from_millis(1);

struct Timer {
    due: Duration,
    period: Option<Duration>,
    callback: TimerCallback,
}

#[derive(Default)]
pub(crate) struct TimerQueue {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, Timer>,
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now)
            .field("pending", &self.timers.len())
            .finish()
    }
}

impl TimerQueue {
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn schedule(
        &mut self,
        delay: Duration,
        period: Option<Duration>,
        callback: TimerCallback,
    ) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(
            id,
            Timer {
                due: self.now + delay,
                period: period.map(|p| p.max(MIN_PERIOD)),
                callback,
            },
        );
        id
    }

    pub(crate) fn clear(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub(crate) fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pop the next timer due at or before `limit`, moving the clock to its
    /// deadline. Intervals are re-armed in place.
    pub(crate) fn take_due(&mut self, limit: Duration) -> Option<TimerCallback> {
        let (id, due) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(id, t)| (t.due, **id))
            .map(|(id, t)| (*id, t.due))?;
        self.now = self.now.max(due);
        let timer = self.timers.get_mut(&id)?;
        let callback = Rc::clone(&timer.callback);
        match timer.period {
            Some(period) => timer.due = due + period,
            None => {
                self.timers.remove(&id);
            }
        }
        Some(callback)
    }

    pub(crate) fn settle(&mut self, limit: Duration) {
        self.now = self.now.max(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn take_due_orders_by_deadline_then_id() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = TimerQueue::default();
        for (label, delay) in [("late", 20), ("early", 10), ("tie", 10)] {
            let log = Rc::clone(&log);
            queue.schedule(
                Duration::from_millis(delay),
                None,
                Rc::new(move || log.borrow_mut().push(label)),
            );
        }
        while let Some(cb) = queue.take_due(Duration::from_millis(50)) {
            cb();
        }
        assert_eq!(*log.borrow(), vec!["early", "tie", "late"]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn interval_is_rearmed() {
        let mut queue = TimerQueue::default();
        queue.schedule(
            Duration::from_millis(5),
            Some(Duration::from_millis(5)),
            Rc::new(|| {}),
        );
        let mut fired = 0;
        while queue.take_due(Duration::from_millis(20)).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 4);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.now(), Duration::from_millis(20));
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut queue = TimerQueue::default();
        queue.schedule(Duration::ZERO, Some(Duration::ZERO), Rc::new(|| {}));
        let mut fired = 0;
        while queue.take_due(Duration::from_millis(3)).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 4);
    }
}
