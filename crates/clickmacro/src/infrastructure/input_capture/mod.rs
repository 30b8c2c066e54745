//! Input capture infrastructure.
//!
//! On Windows, this installs low-level keyboard and mouse hooks (WH_KEYBOARD_LL,
//! WH_MOUSE_LL) on a dedicated Win32 message loop thread. Raw events are placed
//! into an `mpsc` channel and consumed by the input pump thread in `main`.
//!
//! The hook callbacks must complete within ~300ms or Windows will remove the
//! hook, so no processing happens inside them.
//!
//! # Testability
//!
//! The `InputSource` trait allows unit tests to inject synthetic events without
//! requiring OS hooks. See [`mock::MockInputSource`].

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc;

use thiserror::Error;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// A raw input event produced by the input capture infrastructure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInputEvent {
    /// A key was pressed down.
    KeyDown { key: Key },
    /// A key was released.
    KeyUp { key: Key },
    /// A mouse button was pressed at an absolute screen position.
    MouseButtonDown { button: MouseButton, x: i32, y: i32 },
    /// A mouse button was released at an absolute screen position.
    MouseButtonUp { button: MouseButton, x: i32, y: i32 },
}

/// Mouse button identifier used in [`RawInputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

/// Keys that can be bound to controller commands.
///
/// Keys without a named variant are carried as their platform code in
/// [`Key::Other`] so they can still be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Escape,
    Pause,
    ScrollLock,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Other(u32),
}

/// Error returned when a key name in the configuration is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key name: {0:?}")]
pub struct UnknownKey(pub String);

const NAMED_KEYS: &[(Key, &str)] = &[
    (Key::F1, "F1"),
    (Key::F2, "F2"),
    (Key::F3, "F3"),
    (Key::F4, "F4"),
    (Key::F5, "F5"),
    (Key::F6, "F6"),
    (Key::F7, "F7"),
    (Key::F8, "F8"),
    (Key::F9, "F9"),
    (Key::F10, "F10"),
    (Key::F11, "F11"),
    (Key::F12, "F12"),
    (Key::Escape, "Escape"),
    (Key::Pause, "Pause"),
    (Key::ScrollLock, "ScrollLock"),
    (Key::Insert, "Insert"),
    (Key::Delete, "Delete"),
    (Key::Home, "Home"),
    (Key::End, "End"),
    (Key::PageUp, "PageUp"),
    (Key::PageDown, "PageDown"),
];

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("esc") {
            return Ok(Key::Escape);
        }
        NAMED_KEYS
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(key, _)| *key)
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Key::Other(code) = self {
            return f.pad(&format!("key 0x{code:02X}"));
        }
        let name = NAMED_KEYS
            .iter()
            .find(|(key, _)| key == self)
            .map(|(_, n)| *n)
            .unwrap_or("?");
        f.pad(name)
    }
}

/// Error type for input capture operations.
///
/// Any of these is fatal to the process: nothing can be recorded without a
/// working listener.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to install keyboard hook: {0}")]
    KeyboardHookInstallFailed(String),
    #[error("failed to install mouse hook: {0}")]
    MouseHookInstallFailed(String),
    #[error("input capture has already been started")]
    AlreadyStarted,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting input event production.
///
/// The production implementation uses Windows hooks; tests use [`mock::MockInputSource`].
pub trait InputSource: Send {
    /// Starts the input source and returns a receiver for captured events.
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError>;
    /// Stops the input source and releases all OS resources.
    fn stop(&self);
}

/// Returns the input source for the current platform.
///
/// # Errors
///
/// Returns [`CaptureError::UnsupportedPlatform`] where no global hook
/// implementation exists.
pub fn platform_input_source() -> Result<Box<dyn InputSource>, CaptureError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(windows::WindowsInputCaptureService::new()))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Err(CaptureError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}
