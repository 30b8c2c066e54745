//! clickmacro library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does clickmacro do?
//!
//! 1. Listens to global mouse and keyboard input.
//! 2. While recording, appends every pointer press (with the time since the
//!    previous press) to an in-memory macro.
//! 3. On request, replays the macro on a background task: move the pointer,
//!    click, wait the recorded gap, repeat, optionally looping the whole
//!    sequence several times.
//! 4. Lets the operator abort a replay at any point.
//!
//! Hotkeys (F1–F4 and Escape by default) drive the state machine; see
//! [`application::dispatch_input`].

/// Application layer: the playback state machine and its use cases.
pub mod application;

/// Infrastructure layer: OS adapters and configuration storage.
pub mod infrastructure;
