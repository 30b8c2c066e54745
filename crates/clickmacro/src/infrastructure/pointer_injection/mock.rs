//! Recording pointer injector for tests and `--dry-run`.
//!
//! Nothing reaches the OS. Every successful call is appended to an in-memory
//! list so tests can assert exactly what a replay did and in what order, and
//! logged at debug level so a dry run shows the same sequence.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::application::replay_clicks::{InjectionError, PointerInjector};

/// One call made on the injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedAction {
    MoveTo { x: i32, y: i32 },
    Click,
}

/// A [`PointerInjector`] that records calls instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    actions: Mutex<Vec<InjectedAction>>,
    click_calls: AtomicUsize,
    /// 1-based number of the `click` call that should fail; 0 for none.
    fail_click: AtomicUsize,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`th call to `click` (1-based, counting every call so far)
    /// fail with [`InjectionError::Platform`]. The failed click is not
    /// recorded.
    pub fn fail_click_number(&self, n: usize) {
        self.fail_click.store(n, Ordering::SeqCst);
    }

    /// All recorded actions in call order.
    pub fn actions(&self) -> Vec<InjectedAction> {
        self.actions.lock().clone()
    }

    /// Positions passed to successful `move_to` calls, in order.
    pub fn moves(&self) -> Vec<(i32, i32)> {
        self.actions
            .lock()
            .iter()
            .filter_map(|a| match *a {
                InjectedAction::MoveTo { x, y } => Some((x, y)),
                InjectedAction::Click => None,
            })
            .collect()
    }

    /// Number of successful clicks.
    pub fn click_count(&self) -> usize {
        self.actions
            .lock()
            .iter()
            .filter(|a| **a == InjectedAction::Click)
            .count()
    }
}

impl PointerInjector for RecordingInjector {
    fn move_to(&self, x: i32, y: i32) -> Result<(), InjectionError> {
        debug!("move pointer to ({x}, {y})");
        self.actions.lock().push(InjectedAction::MoveTo { x, y });
        Ok(())
    }

    fn click(&self) -> Result<(), InjectionError> {
        let call = self.click_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_click.load(Ordering::SeqCst) {
            return Err(InjectionError::Platform(format!(
                "simulated failure on click {call}"
            )));
        }
        debug!("click");
        self.actions.lock().push(InjectedAction::Click);
        Ok(())
    }
}
