//! Host-driven timers.
//!
//! The engine owns no event loop. A [`Ticker`] records whether the periodic
//! animation callback should be running; a [`Deadline`] is a one-shot timer
//! that fires the first time the host ticks at or after its due time.

use crate::model::Timestamp;

/// One-shot timer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deadline {
    due: Option<Timestamp>,
}

impl Deadline {
    /// Arm (or re-arm) to fire `after_ms` from `now`.
    pub fn arm(&mut self, now: Timestamp, after_ms: u32) {
        self.due = Some(now.plus_ms(f64::from(after_ms)));
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.due = None;
    }

    /// True while armed and not yet fired.
    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// When the timer fires, if armed.
    pub fn due(&self) -> Option<Timestamp> {
        self.due
    }

    /// Fire if due: returns `true` once and disarms.
    pub fn take_if_due(&mut self, now: Timestamp) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Periodic animation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker {
    interval_ms: f64,
    next_due: Option<Timestamp>,
}

impl Ticker {
    /// Stopped ticker with the given interval.
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: f64::from(interval_ms),
            next_due: None,
        }
    }

    /// Start ticking. Returns `false` (and changes nothing) if already running.
    pub fn start(&mut self, now: Timestamp) -> bool {
        if self.is_running() {
            return false;
        }
        self.next_due = Some(now.plus_ms(self.interval_ms));
        true
    }

    /// Stop ticking. Safe to call when stopped.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// True between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Record that a tick ran at `now`; the next one is due one interval later.
    pub fn mark_ticked(&mut self, now: Timestamp) {
        if self.is_running() {
            self.next_due = Some(now.plus_ms(self.interval_ms));
        }
    }

    /// When the next tick is due, if running.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.next_due
    }

    /// Configured interval.
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: f64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn deadline_fires_once_when_due() {
        let mut deadline = Deadline::default();
        deadline.arm(at(0.0), 200);
        assert!(!deadline.take_if_due(at(199.0)));
        assert!(deadline.take_if_due(at(200.0)));
        assert!(!deadline.is_armed());
        assert!(!deadline.take_if_due(at(400.0)));
    }

    #[test]
    fn cancelled_deadline_never_fires() {
        let mut deadline = Deadline::default();
        deadline.arm(at(0.0), 100);
        deadline.cancel();
        assert!(!deadline.take_if_due(at(1000.0)));
    }

    #[test]
    fn ticker_start_is_idempotent() {
        let mut ticker = Ticker::new(10);
        assert!(ticker.start(at(0.0)));
        assert!(!ticker.start(at(5.0)));
        assert_eq!(ticker.next_due(), Some(at(10.0)));
    }

    #[test]
    fn ticker_stop_clears_due_time() {
        let mut ticker = Ticker::new(16);
        ticker.start(at(0.0));
        ticker.stop();
        ticker.stop();
        assert!(!ticker.is_running());
        assert_eq!(ticker.next_due(), None);
    }

    #[test]
    fn mark_ticked_reschedules_only_while_running() {
        let mut ticker = Ticker::new(10);
        ticker.mark_ticked(at(3.0));
        assert_eq!(ticker.next_due(), None);
        ticker.start(at(0.0));
        ticker.mark_ticked(at(27.0));
        assert_eq!(ticker.next_due(), Some(at(37.0)));
    }
}
