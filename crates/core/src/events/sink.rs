//! Bookmark event sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::BookmarkEvent;

/// Trait for receiving bookmark events.
///
/// The service emits events through this trait after successful mutations.
///
/// # Design Rules
///
/// - `emit()` must be fast and non-blocking (no network calls, no DB writes)
/// - Failure to deliver must not affect the domain operation (best-effort)
/// - Events for one owner identity must be delivered in emit order
pub trait BookmarkEventSink: Send + Sync {
    /// Emit a single bookmark event.
    fn emit(&self, event: BookmarkEvent);
}

/// No-op implementation for tests or contexts that don't need events.
#[derive(Clone, Default)]
pub struct NoOpBookmarkEventSink;

impl BookmarkEventSink for NoOpBookmarkEventSink {
    fn emit(&self, _event: BookmarkEvent) {
        // Intentionally empty - events are discarded
    }
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockBookmarkEventSink {
    events: Arc<Mutex<Vec<BookmarkEvent>>>,
}

impl MockBookmarkEventSink {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<BookmarkEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Returns true if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl BookmarkEventSink for MockBookmarkEventSink {
    fn emit(&self, event: BookmarkEvent) {
        self.events.lock().unwrap().push(event);
    }
}
