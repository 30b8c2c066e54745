//! Cooperative cancellation for the replay task.
//!
//! The abort request is a plain `AtomicBool` polled by the replay loop at
//! its checkpoints, paired with a [`Notify`] so a replay that is sleeping
//! through a long recorded interval wakes up immediately instead of waiting
//! the interval out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// The abort flag shared by the controller and the replay task.
#[derive(Debug, Default)]
pub(crate) struct AbortSignal {
    requested: AtomicBool,
    wake: Notify,
}

impl AbortSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes a replay task blocked in [`sleep`](Self::sleep).
    ///
    /// Idempotent. With no sleeper the flag simply stays set until cleared.
    pub(crate) fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.wake.notify_waiters();
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }

    /// Sleeps for `duration` unless an abort is requested first.
    ///
    /// Returns `true` if the flag is set when the sleep ends, whether the
    /// request arrived before, during, or right after the wait.
    pub(crate) async fn sleep(&self, duration: Duration) -> bool {
        // Register for wake-ups before checking the flag so a request landing
        // between the check and the select is not lost.
        let notified = self.wake.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.is_requested() {
            return true;
        }
        if duration.is_zero() {
            // Back-to-back clicks still give the runtime a turn.
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                _ = notified => {}
            }
        }
        self.is_requested()
    }
}
