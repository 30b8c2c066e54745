//! Replays a recorded macro through a [`PointerInjector`].
//!
//! The loop runs on the background replay task. It only ever sees an
//! immutable snapshot of the macro store, polls the abort signal at every
//! checkpoint (loop boundary, before and after each recorded wait), and stops
//! at the first injection failure.

use clickmacro_core::{ClickEvent, LoopCount};
use thiserror::Error;
use tracing::info;

use super::session::{ControllerEvent, Shared};

/// Error type for pointer injection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("pointer injection not supported on {0}")]
    UnsupportedPlatform(String),
}

/// Moves the pointer and clicks on behalf of the replay task.
///
/// Each supported OS provides an implementation in the infrastructure layer.
/// Calls are made synchronously from the replay task, `move_to` first.
#[cfg_attr(test, mockall::automock)]
pub trait PointerInjector: Send + Sync {
    /// Moves the pointer to an absolute screen position.
    fn move_to(&self, x: i32, y: i32) -> Result<(), InjectionError>;

    /// Presses and releases the primary button at the current position.
    fn click(&self) -> Result<(), InjectionError>;
}

/// How a replay run ended. `clicks` counts completed move-and-click steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    Completed { clicks: usize },
    Aborted { clicks: usize },
    Failed { clicks: usize, error: InjectionError },
}

/// Plays `events` `loops` times, honouring each recorded interval.
pub(crate) async fn replay_clicks(
    shared: &Shared,
    events: &[ClickEvent],
    loops: LoopCount,
) -> ReplayOutcome {
    let total = events.len();
    let mut clicks = 0;

    for loop_index in 1..=loops.get() {
        if shared.abort.is_requested() {
            return ReplayOutcome::Aborted { clicks };
        }
        info!("loop {loop_index}/{loops}");
        shared.publish(ControllerEvent::LoopStarted { loop_index, loops });

        for (i, event) in events.iter().enumerate() {
            if shared.abort.is_requested() {
                return ReplayOutcome::Aborted { clicks };
            }
            if shared.abort.sleep(event.interval).await {
                return ReplayOutcome::Aborted { clicks };
            }

            if let Err(error) = inject(shared, event) {
                return ReplayOutcome::Failed { clicks, error };
            }
            clicks += 1;

            let step = i + 1;
            info!("({step}/{total}) click at {event}");
            shared.publish(ControllerEvent::StepReplayed {
                loop_index,
                step,
                total,
                event: *event,
            });
        }
    }

    ReplayOutcome::Completed { clicks }
}

fn inject(shared: &Shared, event: &ClickEvent) -> Result<(), InjectionError> {
    shared.injector.move_to(event.x, event.y)?;
    shared.injector.click()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clickmacro_core::ManualClock;
    use mockall::Sequence;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn make_shared(
        injector: MockPointerInjector,
    ) -> (Shared, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Shared::new(Arc::new(injector), Arc::new(ManualClock::new()), tx);
        (shared, rx)
    }

    fn two_clicks() -> Vec<ClickEvent> {
        vec![
            ClickEvent::new(Duration::ZERO, 0, 0),
            ClickEvent::new(Duration::from_millis(500), 10, 10),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_moves_then_clicks_for_each_event_in_order() {
        // Arrange
        let mut injector = MockPointerInjector::new();
        let mut seq = Sequence::new();
        injector
            .expect_move_to()
            .withf(|x, y| (*x, *y) == (0, 0))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        injector
            .expect_click()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        injector
            .expect_move_to()
            .withf(|x, y| (*x, *y) == (10, 10))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        injector
            .expect_click()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        let (shared, _rx) = make_shared(injector);

        // Act
        let outcome = replay_clicks(&shared, &two_clicks(), LoopCount::ONCE).await;

        // Assert
        assert_eq!(outcome, ReplayOutcome::Completed { clicks: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_stops_at_first_injection_failure() {
        // Arrange – the second click fails
        let mut injector = MockPointerInjector::new();
        injector.expect_move_to().times(2).returning(|_, _| Ok(()));
        let mut calls = 0;
        injector.expect_click().times(2).returning(move || {
            calls += 1;
            if calls == 2 {
                Err(InjectionError::Platform("SendInput failed".to_string()))
            } else {
                Ok(())
            }
        });
        let (shared, _rx) = make_shared(injector);
        let loops = LoopCount::new(3).unwrap();

        // Act
        let outcome = replay_clicks(&shared, &two_clicks(), loops).await;

        // Assert – no retry and no further steps
        assert_eq!(
            outcome,
            ReplayOutcome::Failed {
                clicks: 1,
                error: InjectionError::Platform("SendInput failed".to_string()),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_failure_skips_the_click() {
        let mut injector = MockPointerInjector::new();
        injector
            .expect_move_to()
            .times(1)
            .returning(|_, _| Err(InjectionError::Platform("no desktop".to_string())));
        injector.expect_click().never();
        let (shared, _rx) = make_shared(injector);

        let outcome = replay_clicks(&shared, &two_clicks(), LoopCount::ONCE).await;

        assert!(matches!(outcome, ReplayOutcome::Failed { clicks: 0, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_abort_stops_before_first_step() {
        // Arrange
        let mut injector = MockPointerInjector::new();
        injector.expect_move_to().never();
        injector.expect_click().never();
        let (shared, _rx) = make_shared(injector);
        shared.abort.request();

        // Act
        let outcome = replay_clicks(&shared, &two_clicks(), LoopCount::ONCE).await;

        // Assert
        assert_eq!(outcome, ReplayOutcome::Aborted { clicks: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_publishes_loop_markers_and_steps() {
        // Arrange
        let mut injector = MockPointerInjector::new();
        injector.expect_move_to().returning(|_, _| Ok(()));
        injector.expect_click().returning(|| Ok(()));
        let (shared, mut rx) = make_shared(injector);
        let loops = LoopCount::new(2).unwrap();

        // Act
        replay_clicks(&shared, &two_clicks(), loops).await;

        // Assert
        let mut published = Vec::new();
        while let Ok(event) = rx.try_recv() {
            published.push(event);
        }
        let markers: Vec<u32> = published
            .iter()
            .filter_map(|e| match e {
                ControllerEvent::LoopStarted { loop_index, .. } => Some(*loop_index),
                _ => None,
            })
            .collect();
        let steps: Vec<(u32, usize, usize)> = published
            .iter()
            .filter_map(|e| match e {
                ControllerEvent::StepReplayed { loop_index, step, total, .. } => {
                    Some((*loop_index, *step, *total))
                }
                _ => None,
            })
            .collect();
        assert_eq!(markers, vec![1, 2]);
        assert_eq!(steps, vec![(1, 1, 2), (1, 2, 2), (2, 1, 2), (2, 2, 2)]);
    }
}
