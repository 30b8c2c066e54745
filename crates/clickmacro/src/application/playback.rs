//! PlaybackController: the Idle / Recording / Replaying state machine.
//!
//! The controller owns the macro store, the session state and the abort
//! signal. Every transition takes the session lock, checks its precondition,
//! and either mutates state or returns a [`ControlError`] without touching
//! anything. Accepted replays run on exactly one Tokio task; its
//! `JoinHandle` is kept so shutdown can wait for it.
//!
//! # Transitions
//!
//! ```text
//!            start_recording            start_replay
//!   Idle ─────────────────────► Recording     Idle ─────────────► Replaying
//!    ▲                              │           ▲                     │
//!    └────── stop_recording ────────┘           └── task completes ───┘
//!                                                   (done / aborted / failed)
//! ```

use std::sync::Arc;

use clickmacro_core::{ClickEvent, Clock, LoopCount, SessionState};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::record_clicks::EventRecorder;
use super::replay_clicks::{replay_clicks, PointerInjector};
use super::session::Shared;

pub use super::session::ControllerEvent;

/// A transition requested while its precondition does not hold.
///
/// Rejections never change state and are not retried; the operator has to
/// fix the precondition and issue the command again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("already recording")]
    AlreadyRecording,
    #[error("not recording")]
    NotRecording,
    #[error("cannot record while replaying")]
    CannotRecordWhileReplaying,
    #[error("cannot replay while recording")]
    CannotReplayWhileRecording,
    #[error("already replaying")]
    AlreadyReplaying,
    #[error("nothing recorded")]
    NothingRecorded,
}

/// Owns the recording session and drives replay runs.
pub struct PlaybackController {
    shared: Arc<Shared>,
    runtime: Handle,
    replay_task: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackController {
    /// Creates an idle controller with an empty macro store.
    ///
    /// Replay tasks are spawned onto `runtime`, so the transition methods may
    /// be called from any thread. The returned receiver yields progress and
    /// status events in order.
    pub fn new(
        injector: Arc<dyn PointerInjector>,
        clock: Arc<dyn Clock>,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            shared: Arc::new(Shared::new(injector, clock, tx)),
            runtime,
            replay_task: Mutex::new(None),
        };
        (controller, rx)
    }

    /// Returns a recorder bound to this controller's session.
    pub fn recorder(&self) -> EventRecorder {
        EventRecorder::new(Arc::clone(&self.shared))
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        self.shared.session.lock().state
    }

    /// Number of clicks in the macro store.
    pub fn recorded_len(&self) -> usize {
        self.shared.session.lock().store.len()
    }

    /// Returns a copy of the recorded clicks in replay order.
    pub fn recorded_events(&self) -> Arc<[ClickEvent]> {
        self.shared.session.lock().store.snapshot()
    }

    /// Returns `true` while an abort request has not yet been consumed.
    pub fn abort_pending(&self) -> bool {
        self.shared.abort.is_requested()
    }

    /// Loop count that the next replay run will use.
    pub fn loop_count(&self) -> LoopCount {
        self.shared.session.lock().loop_count
    }

    /// Sets the loop count for subsequent replay runs.
    ///
    /// A run already in progress keeps the count it started with.
    pub fn set_loop_count(&self, loops: LoopCount) {
        self.shared.session.lock().loop_count = loops;
        info!("loop count set to {loops}");
    }

    /// Clears the macro store and starts appending presses to it.
    ///
    /// # Errors
    ///
    /// [`ControlError::AlreadyRecording`] or
    /// [`ControlError::CannotRecordWhileReplaying`].
    pub fn start_recording(&self) -> Result<(), ControlError> {
        let mut session = self.shared.session.lock();
        match session.state {
            SessionState::Recording => return rejected("start recording", ControlError::AlreadyRecording),
            SessionState::Replaying => {
                return rejected("start recording", ControlError::CannotRecordWhileReplaying)
            }
            SessionState::Idle => {}
        }

        session.store.clear();
        session.timer.reset();
        session.state = SessionState::Recording;
        info!("recording started");
        self.shared.publish(ControllerEvent::RecordingStarted);
        Ok(())
    }

    /// Stops recording and returns the number of recorded clicks.
    ///
    /// # Errors
    ///
    /// [`ControlError::NotRecording`] when no recording is in progress.
    pub fn stop_recording(&self) -> Result<usize, ControlError> {
        let mut session = self.shared.session.lock();
        if session.state != SessionState::Recording {
            return rejected("stop recording", ControlError::NotRecording);
        }

        session.state = SessionState::Idle;
        let recorded = session.store.len();
        info!("recording stopped: {recorded} clicks recorded");
        self.shared.publish(ControllerEvent::RecordingStopped { recorded });
        Ok(recorded)
    }

    /// Starts replaying the macro store on a background task and returns
    /// without waiting for it.
    ///
    /// A stale abort request left over from an idle period is discarded.
    ///
    /// # Errors
    ///
    /// [`ControlError::CannotReplayWhileRecording`],
    /// [`ControlError::AlreadyReplaying`] or [`ControlError::NothingRecorded`].
    /// No task is spawned in any of these cases.
    pub fn start_replay(&self) -> Result<(), ControlError> {
        let mut session = self.shared.session.lock();
        match session.state {
            SessionState::Recording => {
                return rejected("start replay", ControlError::CannotReplayWhileRecording)
            }
            SessionState::Replaying => return rejected("start replay", ControlError::AlreadyReplaying),
            SessionState::Idle => {}
        }
        if session.store.is_empty() {
            return rejected("start replay", ControlError::NothingRecorded);
        }

        let events = session.store.snapshot();
        let loops = session.loop_count;
        self.shared.abort.clear();
        session.state = SessionState::Replaying;
        info!("replay started: {} clicks x {loops} loops", events.len());
        self.shared.publish(ControllerEvent::ReplayStarted {
            steps: events.len(),
            loops,
        });

        let shared = Arc::clone(&self.shared);
        let handle = self.runtime.spawn(async move {
            let outcome = replay_clicks(&shared, &events, loops).await;
            shared.finish_replay(outcome);
        });
        // Stored before the session lock is released so a run that finishes
        // instantly cannot have its successor's handle overwritten.
        *self.replay_task.lock() = Some(handle);
        Ok(())
    }

    /// Asks the running replay to stop at its next checkpoint.
    ///
    /// Allowed in any state and idempotent. Outside Replaying the request has
    /// no effect and is discarded by the next [`start_replay`](Self::start_replay).
    pub fn request_abort(&self) {
        self.shared.abort.request();
        let state = self.shared.session.lock().state;
        if state == SessionState::Replaying {
            info!("replay abort requested");
        } else {
            debug!("abort requested while {state}; nothing to stop");
        }
        self.shared.publish(ControllerEvent::AbortRequested);
    }

    /// Waits for the current replay task, if any, to finish.
    pub async fn join_replay(&self) {
        let handle = self.replay_task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("replay task ended abnormally: {e}");
            }
        }
    }

    /// Aborts any running replay and waits for its task to exit.
    pub async fn shutdown(&self) {
        if self.state() == SessionState::Replaying {
            self.request_abort();
        }
        self.join_replay().await;
        debug!("playback controller shut down");
    }
}

fn rejected<T>(operation: &str, err: ControlError) -> Result<T, ControlError> {
    warn!("{operation} rejected: {err}");
    Err(err)
}
