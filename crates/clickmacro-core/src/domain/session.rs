//! Session mode and replay repetition count.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The operating mode of the recorder. Exactly one is active at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Neither recording nor replaying.
    #[default]
    Idle,
    /// Presses are being appended to the macro store.
    Recording,
    /// A background task is replaying the macro store.
    Replaying,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Replaying => "replaying",
        };
        f.write_str(name)
    }
}

/// Error returned when a loop count is not a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoopCountError {
    #[error("loop count must be at least 1")]
    Zero,
}

/// Number of full passes over the macro store in one replay run. Always ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LoopCount(NonZeroU32);

impl LoopCount {
    /// A single pass.
    pub const ONCE: LoopCount = LoopCount(NonZeroU32::MIN);

    /// Validates `count` as a loop count.
    ///
    /// # Errors
    ///
    /// Returns [`LoopCountError::Zero`] when `count` is 0.
    pub fn new(count: u32) -> Result<Self, LoopCountError> {
        NonZeroU32::new(count).map(Self).ok_or(LoopCountError::Zero)
    }

    /// Returns the count as a plain integer.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for LoopCount {
    fn default() -> Self {
        Self::ONCE
    }
}

impl TryFrom<u32> for LoopCount {
    type Error = LoopCountError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LoopCount> for u32 {
    fn from(value: LoopCount) -> Self {
        value.get()
    }
}

impl fmt::Display for LoopCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
