//! Throttle events.

use crate::domain::request::RequestInfo;
use std::fmt;

/// How urgent an event is for an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine traffic detail.
    Info,
    /// A client was denied.
    Warning,
    /// A client changed state in a way that wants attention.
    Alert,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Alert => "alert",
        };
        f.write_str(name)
    }
}

/// Something the throttle wants an operator to know about.
///
/// Events are observational: emitted after a decision is made, never part of
/// making it. Each carries the client descriptor so sinks can attribute it
/// without re-deriving anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleEvent {
    /// An admitted request. Emitted only in verbose mode.
    RequestProcessed {
        client: RequestInfo,
        /// Window count after admitting this request.
        request_count: u32,
        limit: u32,
    },
    /// A request denied for exceeding the window limit.
    LimitExceeded {
        client: RequestInfo,
        /// Requests already admitted in the window.
        request_count: u32,
        limit: u32,
        /// When the window resets, seconds since the Unix epoch.
        reset_at: u64,
        /// Violation count after this denial, when blacklisting is configured.
        violations: Option<u32>,
    },
    /// A signature just crossed the violation threshold onto the blacklist.
    ClientBlacklisted {
        client: RequestInfo,
        violations: u32,
        threshold: u32,
    },
    /// A request from an already-blacklisted client was blocked.
    BlacklistHit { client: RequestInfo },
}

impl ThrottleEvent {
    /// Severity an operator should file this event under.
    pub fn severity(&self) -> Severity {
        match self {
            ThrottleEvent::RequestProcessed { .. } => Severity::Info,
            ThrottleEvent::LimitExceeded { .. } | ThrottleEvent::BlacklistHit { .. } => {
                Severity::Warning
            }
            ThrottleEvent::ClientBlacklisted { .. } => Severity::Alert,
        }
    }

    /// The client the event is about.
    pub fn client(&self) -> &RequestInfo {
        match self {
            ThrottleEvent::RequestProcessed { client, .. }
            | ThrottleEvent::LimitExceeded { client, .. }
            | ThrottleEvent::ClientBlacklisted { client, .. }
            | ThrottleEvent::BlacklistHit { client } => client,
        }
    }
}
