//! State shared between the controller, the recorder and the replay task.
//!
//! Everything that more than one execution context touches lives in
//! [`Shared`]: the session (state, macro store, interval timer, loop count)
//! behind one lock, and the abort signal beside it. None of it is reachable
//! from outside the application layer; callers only see the operations on
//! `PlaybackController` and `EventRecorder`.

use std::sync::Arc;

use clickmacro_core::{ClickEvent, Clock, IntervalTimer, LoopCount, MacroStore, SessionState};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::abort_signal::AbortSignal;
use super::replay_clicks::{PointerInjector, ReplayOutcome};

/// Progress and status notifications for the presentation layer.
///
/// Delivered in the order the underlying transitions happen.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    RecordingStarted,
    /// A press was appended; `index` is 1-based.
    ClickRecorded { index: usize, event: ClickEvent },
    RecordingStopped { recorded: usize },
    AbortRequested,
    ReplayStarted { steps: usize, loops: LoopCount },
    /// Marks the start of pass `loop_index` (1-based) of `loops`.
    LoopStarted { loop_index: u32, loops: LoopCount },
    /// Step `step` (1-based) of `total` was injected during pass `loop_index`.
    StepReplayed {
        loop_index: u32,
        step: usize,
        total: usize,
        event: ClickEvent,
    },
    ReplayCompleted { clicks: usize },
    ReplayAborted { clicks: usize },
    ReplayFailed { clicks: usize, error: String },
}

/// Mutable session data guarded by [`Shared::session`].
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub(crate) state: SessionState,
    pub(crate) store: MacroStore,
    pub(crate) timer: IntervalTimer,
    pub(crate) loop_count: LoopCount,
}

pub(crate) struct Shared {
    pub(crate) session: Mutex<Session>,
    pub(crate) abort: AbortSignal,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) injector: Arc<dyn PointerInjector>,
    events: mpsc::UnboundedSender<ControllerEvent>,
}

impl Shared {
    pub(crate) fn new(
        injector: Arc<dyn PointerInjector>,
        clock: Arc<dyn Clock>,
        events: mpsc::UnboundedSender<ControllerEvent>,
    ) -> Self {
        Self {
            session: Mutex::new(Session::default()),
            abort: AbortSignal::new(),
            clock,
            injector,
            events,
        }
    }

    /// Sends `event` to the presentation layer.
    ///
    /// A dropped receiver just means nobody is watching.
    pub(crate) fn publish(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }

    /// Ends a replay run: clears the abort flag, returns to Idle and reports
    /// the outcome, all under the session lock so an observer of the terminal
    /// event always sees the Idle state.
    pub(crate) fn finish_replay(&self, outcome: ReplayOutcome) {
        let mut session = self.session.lock();
        self.abort.clear();
        session.state = SessionState::Idle;

        let event = match outcome {
            ReplayOutcome::Completed { clicks } => {
                info!("replay finished ({clicks} clicks)");
                ControllerEvent::ReplayCompleted { clicks }
            }
            ReplayOutcome::Aborted { clicks } => {
                info!("replay aborted after {clicks} clicks");
                ControllerEvent::ReplayAborted { clicks }
            }
            ReplayOutcome::Failed { clicks, error } => {
                error!("replay stopped after {clicks} clicks: {error}");
                ControllerEvent::ReplayFailed {
                    clicks,
                    error: error.to_string(),
                }
            }
        };
        self.publish(event);
    }
}
