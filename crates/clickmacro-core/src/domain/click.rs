//! A single recorded pointer press.

use std::fmt;
use std::time::Duration;

/// One recorded click: where it happened and how long after the previous one.
///
/// `interval` is the gap since the previous click in the same recording
/// session. It is zero for the first click of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Time elapsed since the previous recorded click.
    pub interval: Duration,
    /// Absolute X in screen coordinates.
    pub x: i32,
    /// Absolute Y in screen coordinates.
    pub y: i32,
}

impl ClickEvent {
    /// Creates a click at `(x, y)` that follows the previous one by `interval`.
    pub fn new(interval: Duration, x: i32, y: i32) -> Self {
        Self { interval, x, y }
    }

    /// Returns the click position as an `(x, y)` pair.
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl fmt::Display for ClickEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) after {:.2}s",
            self.x,
            self.y,
            self.interval.as_secs_f64()
        )
    }
}
