//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of application logic.

pub mod cache;
pub mod clock;
pub mod sink;

pub use cache::FailingCache;
pub use clock::MockClock;
pub use sink::MockEventSink;
