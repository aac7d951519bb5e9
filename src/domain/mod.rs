//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the throttling
//! system:
//! - Client signature derivation
//! - Per-signature cache records and window arithmetic
//! - Throttle decisions and their HTTP mapping
//! - Throttle events and severities
//!
//! All types in this layer are pure and easily testable.

pub mod decision;
pub mod event;
pub mod records;
pub mod request;
pub mod signature;
