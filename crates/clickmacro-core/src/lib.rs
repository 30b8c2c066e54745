//! # clickmacro-core
//!
//! Domain layer for ClickMacro, a tool that records pointer clicks and replays
//! them later with the original timing between them.
//!
//! This crate is used by the `clickmacro` application crate. It has zero
//! dependencies on OS APIs, async runtimes, or UI frameworks, so every type in
//! it can be unit-tested in isolation.
//!
//! - **`domain::click`** – a single recorded click and its timing offset.
//! - **`domain::store`** – the ordered sequence of clicks captured by one
//!   recording session.
//! - **`domain::session`** – the Idle / Recording / Replaying mode and the
//!   validated loop count for a replay run.
//! - **`domain::clock`** – time sources and the interval timer that turns
//!   press timestamps into inter-click gaps.

pub mod domain;

pub use domain::click::ClickEvent;
pub use domain::clock::{Clock, IntervalTimer, ManualClock, SystemClock};
pub use domain::session::{LoopCount, LoopCountError, SessionState};
pub use domain::store::MacroStore;
