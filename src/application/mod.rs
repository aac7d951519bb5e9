//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Throttle engine (decision making and event emission)
//! - Metrics (decision counters)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the decision logic independent from
//! storage, clock and logging details.

pub mod engine;
pub mod metrics;
pub mod ports;
