//! EventRecorder: turns raw press notifications into recorded clicks.
//!
//! The recorder runs on whatever thread delivers input notifications. It
//! holds the session lock only long enough to check the state and append, so
//! the input hook is never held up by replay or command handling.

use std::sync::Arc;

use clickmacro_core::{ClickEvent, SessionState};
use tracing::{debug, info};

use super::session::{ControllerEvent, Shared};

/// Records pointer presses into the controller's macro store while the
/// session is Recording. Cheap to clone.
#[derive(Clone)]
pub struct EventRecorder {
    shared: Arc<Shared>,
}

impl EventRecorder {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Handles a pointer press at `(x, y)`.
    ///
    /// Outside Recording this is a no-op and returns `None`. Otherwise the
    /// click is appended with the time elapsed since the previous recorded
    /// press (zero for the first one) and returned.
    pub fn on_press(&self, x: i32, y: i32) -> Option<ClickEvent> {
        let now = self.shared.clock.now();
        let mut session = self.shared.session.lock();
        if session.state != SessionState::Recording {
            debug!("press at ({x}, {y}) ignored while {}", session.state);
            return None;
        }

        let interval = session.timer.lap(now);
        let event = ClickEvent::new(interval, x, y);
        session.store.append(event);
        let index = session.store.len();

        info!("click recorded at ({x}, {y}), interval={:.2}s", interval.as_secs_f64());
        self.shared.publish(ControllerEvent::ClickRecorded { index, event });
        Some(event)
    }

    /// Handles a pointer release. Releases are never recorded.
    pub fn on_release(&self, _x: i32, _y: i32) {}
}
