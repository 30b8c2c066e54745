//! The ordered sequence of clicks captured by one recording session.
//!
//! `MacroStore` does no locking of its own. The playback controller owns the
//! only instance, keeps it behind the session lock, and only appends or clears
//! it while the session is Recording. Replay never reads the store directly:
//! it iterates a [`snapshot`](MacroStore::snapshot) taken when the replay run
//! was accepted.

use std::sync::Arc;

use super::click::ClickEvent;

/// Recorded clicks in replay order.
#[derive(Debug, Default, Clone)]
pub struct MacroStore {
    events: Vec<ClickEvent>,
}

impl MacroStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends a click at the end of the sequence.
    pub fn append(&mut self, event: ClickEvent) {
        self.events.push(event);
    }

    /// Removes every recorded click.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns an immutable copy of the sequence that can be iterated on
    /// another thread while the store itself changes.
    pub fn snapshot(&self) -> Arc<[ClickEvent]> {
        Arc::from(self.events.as_slice())
    }

    /// Returns the recorded clicks as a slice.
    pub fn events(&self) -> &[ClickEvent] {
        &self.events
    }

    /// Number of recorded clicks.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn click(ms: u64, x: i32, y: i32) -> ClickEvent {
        ClickEvent::new(Duration::from_millis(ms), x, y)
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = MacroStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        // Arrange
        let mut store = MacroStore::new();

        // Act
        store.append(click(0, 1, 1));
        store.append(click(100, 2, 2));
        store.append(click(50, 3, 3));

        // Assert
        let positions: Vec<_> = store.events().iter().map(ClickEvent::position).collect();
        assert_eq!(positions, vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_clear_removes_all_events() {
        let mut store = MacroStore::new();
        store.append(click(0, 1, 1));
        store.append(click(10, 2, 2));

        store.clear();

        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutation() {
        // Arrange
        let mut store = MacroStore::new();
        store.append(click(0, 1, 1));
        let snapshot = store.snapshot();

        // Act
        store.clear();
        store.append(click(0, 9, 9));

        // Assert
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].position(), (1, 1));
    }
}
