//! Application layer use cases for clickmacro.
//!
//! # What use cases are there?
//!
//! - **`record_clicks`** – The `EventRecorder` appends pointer presses, with
//!   the gap since the previous press, to the macro store while a recording
//!   session is active.
//!
//! - **`replay_clicks`** – Plays a snapshot of the macro through a
//!   `PointerInjector` for a configured number of loops, honouring each
//!   recorded interval and stopping early on abort or injection failure.
//!
//! - **`playback`** – The `PlaybackController` state machine (Idle,
//!   Recording, Replaying) that guards every transition and owns the single
//!   background replay task.
//!
//! - **`dispatch_input`** – Maps hotkeys to controller commands and routes
//!   pointer presses to the recorder.

pub(crate) mod abort_signal;
pub mod dispatch_input;
pub mod playback;
pub mod record_clicks;
pub mod replay_clicks;
pub(crate) mod session;
