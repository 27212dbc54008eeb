//! Time sources for the engine.
//!
//! The scroller never calls `Instant::now()` directly; it asks its [`Clock`].
//! Hosts use [`SystemClock`], tests and the simulation driver feed synthetic
//! time through a [`ManualClock`].

use crate::model::Timestamp;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of the current time.
pub trait Clock {
    /// Current time.
    fn now(&self) -> Timestamp;
}

/// Monotonic wall clock, measured from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.origin.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Synthetic clock advanced by hand.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the scroller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Clock starting at t = 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock starting at `ms`.
    pub fn starting_at(ms: f64) -> Self {
        let clock = Self::new();
        clock.set(ms);
        clock
    }

    /// Move time forward by `ms`.
    pub fn advance(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: f64) {
        self.now_ms.set(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now_ms.get())
    }
}
