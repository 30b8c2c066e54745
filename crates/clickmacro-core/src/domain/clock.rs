//! Time sources and inter-click interval measurement.
//!
//! The recorder never reads the system time directly. It asks a [`Clock`] for
//! the current instant and feeds it to an [`IntervalTimer`], which remembers
//! the previous press and returns the gap. Tests substitute a [`ManualClock`]
//! so recorded intervals are exact rather than "approximately 500ms".

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A monotonic time source.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Measures the elapsed time between successive recorded presses.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntervalTimer {
    last: Option<Instant>,
}

impl IntervalTimer {
    /// Creates a timer with no previous press.
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Forgets the previous press so the next lap returns zero.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Records a press at `now` and returns the gap since the previous one.
    ///
    /// The first lap after construction or [`reset`](Self::reset) returns
    /// [`Duration::ZERO`]. A `now` earlier than the previous press also yields
    /// zero rather than underflowing.
    pub fn lap(&mut self, now: Instant) -> Duration {
        let interval = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        interval
    }
}
