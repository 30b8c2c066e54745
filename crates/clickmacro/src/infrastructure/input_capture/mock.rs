//! Mock input source for unit testing.
//!
//! Allows tests to inject synthetic [`RawInputEvent`]s without requiring
//! a running Windows message loop or OS hooks.

use std::sync::{
    mpsc::{self, Sender},
    Arc,
};

use parking_lot::Mutex;

use super::{CaptureError, InputSource, Key, MouseButton, RawInputEvent};

/// A mock implementation of [`InputSource`] that allows tests to inject events.
pub struct MockInputSource {
    sender: Arc<Mutex<Option<Sender<RawInputEvent>>>>,
    fail_start: bool,
}

impl MockInputSource {
    /// Creates a new mock input source.
    pub fn new() -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            fail_start: false,
        }
    }

    /// Creates a mock whose `start()` fails, as a missing hook permission would.
    pub fn failing() -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            fail_start: true,
        }
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called or if `stop()` has been called.
    pub fn inject_event(&self, event: RawInputEvent) {
        let guard = self.sender.lock();
        if let Some(ref sender) = *guard {
            sender
                .send(event)
                .expect("receiver has been dropped; call start() first");
        } else {
            panic!("MockInputSource::inject_event called before start()");
        }
    }

    /// Injects a left-button press followed by its release at `(x, y)`.
    pub fn inject_click(&self, x: i32, y: i32) {
        self.inject_event(RawInputEvent::MouseButtonDown {
            button: MouseButton::Left,
            x,
            y,
        });
        self.inject_event(RawInputEvent::MouseButtonUp {
            button: MouseButton::Left,
            x,
            y,
        });
    }

    /// Injects a key press followed by its release.
    pub fn inject_key(&self, key: Key) {
        self.inject_event(RawInputEvent::KeyDown { key });
        self.inject_event(RawInputEvent::KeyUp { key });
    }

    /// Returns `true` between `start()` and `stop()`.
    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }
}

impl Default for MockInputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        if self.fail_start {
            return Err(CaptureError::MouseHookInstallFailed(
                "mock configured to fail".to_string(),
            ));
        }
        let mut guard = self.sender.lock();
        if guard.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::channel();
        *guard = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel
        *self.sender.lock() = None;
    }
}
