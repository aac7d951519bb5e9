//! Event sink adapters.
//!
//! The default sink routes throttle events through `tracing`, mapping
//! severities onto log levels: info for admitted traffic, warn for denials,
//! error for blacklist escalations.

use crate::application::ports::EventSink;
use crate::domain::event::ThrottleEvent;

/// Event sink that logs through the `tracing` crate.
///
/// Every record carries the client descriptor fields plus the counters
/// relevant to the event, with a short human message.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn emit(&self, event: &ThrottleEvent) {
        let client = event.client();
        let address = client.source_address.as_deref().unwrap_or("");
        match event {
            ThrottleEvent::RequestProcessed {
                request_count,
                limit,
                ..
            } => {
                tracing::info!(
                    address,
                    user_agent = %client.user_agent,
                    method = %client.method,
                    path = %client.path,
                    request_count,
                    limit,
                    "request processed"
                );
            }
            ThrottleEvent::LimitExceeded {
                request_count,
                limit,
                reset_at,
                violations,
                ..
            } => {
                tracing::warn!(
                    address,
                    user_agent = %client.user_agent,
                    method = %client.method,
                    path = %client.path,
                    request_count,
                    limit,
                    reset_at,
                    violations = ?violations,
                    "rate limit exceeded"
                );
            }
            ThrottleEvent::ClientBlacklisted {
                violations,
                threshold,
                ..
            } => {
                tracing::error!(
                    address,
                    user_agent = %client.user_agent,
                    method = %client.method,
                    path = %client.path,
                    violations,
                    threshold,
                    "client blacklisted after repeated rate limit violations"
                );
            }
            ThrottleEvent::BlacklistHit { .. } => {
                tracing::warn!(
                    address,
                    user_agent = %client.user_agent,
                    method = %client.method,
                    path = %client.path,
                    "request from blacklisted client blocked"
                );
            }
        }
    }
}
