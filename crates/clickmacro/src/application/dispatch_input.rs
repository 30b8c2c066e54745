//! InputDispatcher: routes captured input to the recorder and the controller.
//!
//! Pointer presses go to the [`EventRecorder`]; key presses are looked up in
//! the [`HotkeyMap`] and turned into controller commands. The dispatcher also
//! owns the input pump loop that drains the capture channel until the
//! operator quits, the process is asked to shut down, or the listener dies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::playback::PlaybackController;
use super::record_clicks::EventRecorder;
use crate::infrastructure::input_capture::{Key, RawInputEvent};

/// How often the pump re-checks the shutdown flag while no input arrives.
const PUMP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Operator commands that can be bound to a hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    StartRecording,
    StopRecording,
    StartReplay,
    RequestAbort,
    Quit,
}

impl Command {
    /// All commands, in the order they are listed in the startup banner.
    pub const ALL: [Command; 5] = [
        Command::StartRecording,
        Command::StopRecording,
        Command::StartReplay,
        Command::RequestAbort,
        Command::Quit,
    ];

    /// Short human-readable description.
    pub fn describe(self) -> &'static str {
        match self {
            Command::StartRecording => "start recording",
            Command::StopRecording => "stop recording",
            Command::StartReplay => "start replay",
            Command::RequestAbort => "abort replay",
            Command::Quit => "quit",
        }
    }
}

/// Key-to-command bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyMap {
    bindings: HashMap<Key, Command>,
}

impl HotkeyMap {
    /// Creates a map with no bindings.
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Binds `key` to `command`, returning the command it was previously bound to.
    pub fn bind(&mut self, key: Key, command: Command) -> Option<Command> {
        self.bindings.insert(key, command)
    }

    /// Returns the command bound to `key`, if any.
    pub fn command_for(&self, key: Key) -> Option<Command> {
        self.bindings.get(&key).copied()
    }

    /// Returns the key bound to `command`, if any.
    pub fn key_for(&self, command: Command) -> Option<Key> {
        self.bindings
            .iter()
            .find(|(_, c)| **c == command)
            .map(|(k, _)| *k)
    }
}

impl Default for HotkeyMap {
    /// F1 record, F2 stop, F3 replay, F4 abort, Escape quit.
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(Key::F1, Command::StartRecording);
        map.bind(Key::F2, Command::StopRecording);
        map.bind(Key::F3, Command::StartReplay);
        map.bind(Key::F4, Command::RequestAbort);
        map.bind(Key::Escape, Command::Quit);
        map
    }
}

/// Whether the pump should keep going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Quit,
}

/// Why [`InputDispatcher::pump`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// The quit hotkey was pressed.
    Quit,
    /// The shared running flag was cleared (e.g. Ctrl-C).
    Shutdown,
    /// The capture channel closed while the process was still running.
    ListenerDisconnected,
}

/// Routes raw input to the recorder and the playback controller.
pub struct InputDispatcher {
    controller: Arc<PlaybackController>,
    recorder: EventRecorder,
    hotkeys: HotkeyMap,
}

impl InputDispatcher {
    pub fn new(controller: Arc<PlaybackController>, hotkeys: HotkeyMap) -> Self {
        let recorder = controller.recorder();
        Self {
            controller,
            recorder,
            hotkeys,
        }
    }

    /// Handles one raw input event.
    pub fn dispatch(&self, event: &RawInputEvent) -> DispatchOutcome {
        match *event {
            RawInputEvent::MouseButtonDown { button, x, y } => {
                debug!("{button:?} button pressed at ({x}, {y})");
                self.recorder.on_press(x, y);
                DispatchOutcome::Continue
            }
            RawInputEvent::MouseButtonUp { x, y, .. } => {
                self.recorder.on_release(x, y);
                DispatchOutcome::Continue
            }
            RawInputEvent::KeyDown { key } => match self.hotkeys.command_for(key) {
                Some(command) => self.execute(command),
                None => {
                    debug!("{key} pressed (unbound)");
                    DispatchOutcome::Continue
                }
            },
            RawInputEvent::KeyUp { .. } => DispatchOutcome::Continue,
        }
    }

    /// Runs `command` against the controller.
    ///
    /// Rejections are logged by the controller and otherwise dropped: there
    /// is no queuing or retry of rejected commands.
    pub fn execute(&self, command: Command) -> DispatchOutcome {
        debug!("hotkey command: {}", command.describe());
        match command {
            Command::StartRecording => {
                let _ = self.controller.start_recording();
            }
            Command::StopRecording => {
                let _ = self.controller.stop_recording();
            }
            Command::StartReplay => {
                let _ = self.controller.start_replay();
            }
            Command::RequestAbort => self.controller.request_abort(),
            Command::Quit => {
                info!("quit requested");
                return DispatchOutcome::Quit;
            }
        }
        DispatchOutcome::Continue
    }

    /// Drains `events` until quit, shutdown, or listener loss.
    ///
    /// Blocks the calling thread. Clears `running` when the quit hotkey is
    /// pressed so every other context sees the shutdown.
    pub fn pump(&self, events: &Receiver<RawInputEvent>, running: &AtomicBool) -> PumpExit {
        loop {
            if !running.load(Ordering::Relaxed) {
                return PumpExit::Shutdown;
            }
            match events.recv_timeout(PUMP_POLL_INTERVAL) {
                Ok(event) => {
                    if self.dispatch(&event) == DispatchOutcome::Quit {
                        running.store(false, Ordering::Relaxed);
                        return PumpExit::Quit;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return if running.load(Ordering::Relaxed) {
                        PumpExit::ListenerDisconnected
                    } else {
                        PumpExit::Shutdown
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::replay_clicks::PointerInjector;
    use crate::infrastructure::input_capture::mock::MockInputSource;
    use crate::infrastructure::input_capture::{InputSource, MouseButton};
    use crate::infrastructure::pointer_injection::mock::RecordingInjector;
    use clickmacro_core::{Clock, SessionState, SystemClock};
    use tokio::runtime::Handle;

    fn make_dispatcher() -> (InputDispatcher, Arc<PlaybackController>, Arc<RecordingInjector>) {
        let injector = Arc::new(RecordingInjector::new());
        let (controller, _rx) = PlaybackController::new(
            Arc::clone(&injector) as Arc<dyn PointerInjector>,
            Arc::new(SystemClock) as Arc<dyn Clock>,
            Handle::current(),
        );
        let controller = Arc::new(controller);
        let dispatcher = InputDispatcher::new(Arc::clone(&controller), HotkeyMap::default());
        (dispatcher, controller, injector)
    }

    // ── HotkeyMap ─────────────────────────────────────────────────────────────

    #[test]
    fn test_default_hotkeys_match_function_key_layout() {
        let map = HotkeyMap::default();
        assert_eq!(map.command_for(Key::F1), Some(Command::StartRecording));
        assert_eq!(map.command_for(Key::F2), Some(Command::StopRecording));
        assert_eq!(map.command_for(Key::F3), Some(Command::StartReplay));
        assert_eq!(map.command_for(Key::F4), Some(Command::RequestAbort));
        assert_eq!(map.command_for(Key::Escape), Some(Command::Quit));
        assert_eq!(map.command_for(Key::F5), None);
    }

    #[test]
    fn test_bind_returns_previous_command() {
        let mut map = HotkeyMap::empty();
        assert_eq!(map.bind(Key::F9, Command::Quit), None);
        assert_eq!(map.bind(Key::F9, Command::StartReplay), Some(Command::Quit));
        assert_eq!(map.key_for(Command::StartReplay), Some(Key::F9));
    }

    #[test]
    fn test_every_command_has_a_default_key() {
        let map = HotkeyMap::default();
        for command in Command::ALL {
            assert!(map.key_for(command).is_some(), "{command:?} has no default key");
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_hotkeys_drive_the_state_machine() {
        // Arrange
        let (dispatcher, controller, _) = make_dispatcher();

        // Act / Assert
        dispatcher.dispatch(&RawInputEvent::KeyDown { key: Key::F1 });
        assert_eq!(controller.state(), SessionState::Recording);
        dispatcher.dispatch(&RawInputEvent::KeyDown { key: Key::F2 });
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_mouse_presses_are_recorded_only_while_recording() {
        // Arrange
        let (dispatcher, controller, _) = make_dispatcher();
        let press = RawInputEvent::MouseButtonDown { button: MouseButton::Left, x: 4, y: 2 };

        // Act
        dispatcher.dispatch(&press);
        dispatcher.dispatch(&RawInputEvent::KeyDown { key: Key::F1 });
        dispatcher.dispatch(&press);
        dispatcher.dispatch(&RawInputEvent::MouseButtonUp { button: MouseButton::Left, x: 4, y: 2 });

        // Assert
        assert_eq!(controller.recorded_len(), 1);
    }

    #[tokio::test]
    async fn test_key_release_and_unbound_keys_are_ignored() {
        let (dispatcher, controller, _) = make_dispatcher();

        let a = dispatcher.dispatch(&RawInputEvent::KeyUp { key: Key::F1 });
        let b = dispatcher.dispatch(&RawInputEvent::KeyDown { key: Key::Other(0x41) });

        assert_eq!(a, DispatchOutcome::Continue);
        assert_eq!(b, DispatchOutcome::Continue);
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_rejected_command_does_not_stop_dispatch() {
        let (dispatcher, controller, injector) = make_dispatcher();

        // F3 with nothing recorded is rejected
        let outcome = dispatcher.dispatch(&RawInputEvent::KeyDown { key: Key::F3 });

        assert_eq!(outcome, DispatchOutcome::Continue);
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(injector.actions().is_empty());
    }

    #[tokio::test]
    async fn test_quit_key_returns_quit() {
        let (dispatcher, _, _) = make_dispatcher();
        let outcome = dispatcher.dispatch(&RawInputEvent::KeyDown { key: Key::Escape });
        assert_eq!(outcome, DispatchOutcome::Quit);
    }

    // ── Pump ──────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_pump_exits_on_quit_and_clears_running_flag() {
        // Arrange
        let (dispatcher, controller, _) = make_dispatcher();
        let source = MockInputSource::new();
        let rx = source.start().unwrap();
        let running = AtomicBool::new(true);
        source.inject_key(Key::F1);
        source.inject_click(1, 1);
        source.inject_key(Key::Escape);

        // Act
        let exit = dispatcher.pump(&rx, &running);

        // Assert
        assert_eq!(exit, PumpExit::Quit);
        assert!(!running.load(Ordering::Relaxed));
        assert_eq!(controller.recorded_len(), 1);
    }

    #[tokio::test]
    async fn test_pump_reports_listener_loss() {
        let (dispatcher, _, _) = make_dispatcher();
        let source = MockInputSource::new();
        let rx = source.start().unwrap();
        let running = AtomicBool::new(true);

        source.stop();
        let exit = dispatcher.pump(&rx, &running);

        assert_eq!(exit, PumpExit::ListenerDisconnected);
    }

    #[tokio::test]
    async fn test_pump_exits_when_running_flag_cleared() {
        let (dispatcher, _, _) = make_dispatcher();
        let source = MockInputSource::new();
        let rx = source.start().unwrap();
        let running = AtomicBool::new(false);

        let exit = dispatcher.pump(&rx, &running);

        assert_eq!(exit, PumpExit::Shutdown);
    }
}
