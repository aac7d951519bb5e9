//! Mock event sink for testing.

use crate::application::ports::EventSink;
use crate::domain::event::ThrottleEvent;
use std::sync::{Arc, Mutex};

/// Mock sink that captures events for testing.
///
/// Clones share the same buffer, so a clone handed to a throttle observes
/// everything the throttle emits.
#[derive(Debug, Clone)]
pub struct MockEventSink {
    captured: Arc<Mutex<Vec<ThrottleEvent>>>,
}

impl MockEventSink {
    /// Create a new mock event sink.
    pub fn new() -> Self {
        Self {
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get all captured events, in emission order.
    pub fn get_captured(&self) -> Vec<ThrottleEvent> {
        self.captured
            .lock()
            .expect("MockEventSink mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }

    /// Get the count of captured events.
    pub fn count(&self) -> usize {
        self.captured
            .lock()
            .expect("MockEventSink mutex poisoned - a test thread panicked while holding the lock")
            .len()
    }

    /// Clear all captured events.
    ///
    /// Useful for resetting state between test cases.
    pub fn clear(&self) {
        self.captured
            .lock()
            .expect("MockEventSink mutex poisoned - a test thread panicked while holding the lock")
            .clear();
    }
}

impl Default for MockEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MockEventSink {
    fn emit(&self, event: &ThrottleEvent) {
        self.captured
            .lock()
            .expect("MockEventSink mutex poisoned - a test thread panicked while holding the lock")
            .push(event.clone());
    }
}
