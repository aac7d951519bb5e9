//! Throttle decisions and their HTTP mapping.

use std::time::Duration;

/// Response body for rate-limited requests.
pub const RATE_LIMITED_BODY: &str = "Too many requests, please try again later.";

/// Response body for blacklisted clients.
pub const BLACKLISTED_BODY: &str =
    r#"{"error":"Access denied due to repeated rate limit violations"}"#;

/// Outcome of evaluating one request against the throttle.
///
/// Decisions are plain values: the engine never writes a response or invokes
/// a next handler. The [`status`](Decision::status),
/// [`headers`](Decision::headers) and [`body`](Decision::body) helpers map a
/// decision onto the conventional HTTP surface for callers that want it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The request is within the limit and should proceed.
    Allowed {
        /// Configured per-window limit.
        limit: u32,
        /// Requests left in the window after this one.
        remaining: u32,
        /// When the window resets, seconds since the Unix epoch.
        reset_at: u64,
    },
    /// The request exceeds the window limit and should be rejected.
    RateLimited {
        /// Configured per-window limit.
        limit: u32,
        /// Requests already admitted in the window.
        request_count: u32,
        /// How long the client should wait before retrying.
        retry_after: Duration,
        /// When the window resets, seconds since the Unix epoch.
        reset_at: u64,
        /// Violation count after this denial, when blacklisting is configured.
        violations: Option<u32>,
        /// Whether this denial pushed the client onto the blacklist.
        escalated: bool,
    },
    /// The client is blacklisted; the request must not proceed.
    Blacklisted,
}

impl Decision {
    /// Whether the request should proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    /// Whether the request was denied for exceeding the window limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Decision::RateLimited { .. })
    }

    /// Whether the request was denied by a blacklist mark.
    pub fn is_blacklisted(&self) -> bool {
        matches!(self, Decision::Blacklisted)
    }

    /// HTTP status for denials. `None` means the request should proceed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Decision::Allowed { .. } => None,
            Decision::RateLimited { .. } => Some(429),
            Decision::Blacklisted => Some(403),
        }
    }

    /// Conventional rate-limit headers for this decision.
    ///
    /// Allowed requests carry the `X-RateLimit-*` family; rate-limited
    /// requests add `Retry-After` in whole seconds and pin remaining to 0;
    /// blacklisted requests carry none.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            Decision::Allowed {
                limit,
                remaining,
                reset_at,
            } => vec![
                ("X-RateLimit-Limit", limit.to_string()),
                ("X-RateLimit-Remaining", remaining.to_string()),
                ("X-RateLimit-Reset", reset_at.to_string()),
            ],
            Decision::RateLimited {
                limit,
                retry_after,
                reset_at,
                ..
            } => vec![
                ("Retry-After", retry_after.as_secs().to_string()),
                ("X-RateLimit-Limit", limit.to_string()),
                ("X-RateLimit-Remaining", "0".to_string()),
                ("X-RateLimit-Reset", reset_at.to_string()),
            ],
            Decision::Blacklisted => Vec::new(),
        }
    }

    /// Response body for denials. `None` means the request should proceed.
    pub fn body(&self) -> Option<&'static str> {
        match self {
            Decision::Allowed { .. } => None,
            Decision::RateLimited { .. } => Some(RATE_LIMITED_BODY),
            Decision::Blacklisted => Some(BLACKLISTED_BODY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Decision {
        Decision::Allowed {
            limit: 10,
            remaining: 7,
            reset_at: 1_700_000_060,
        }
    }

    fn rate_limited() -> Decision {
        Decision::RateLimited {
            limit: 10,
            request_count: 10,
            retry_after: Duration::from_secs(42),
            reset_at: 1_700_000_060,
            violations: Some(3),
            escalated: false,
        }
    }

    #[test]
    fn test_predicates_are_exclusive() {
        assert!(allowed().is_allowed());
        assert!(!allowed().is_rate_limited());
        assert!(!allowed().is_blacklisted());

        assert!(rate_limited().is_rate_limited());
        assert!(!rate_limited().is_allowed());

        assert!(Decision::Blacklisted.is_blacklisted());
        assert!(!Decision::Blacklisted.is_allowed());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(allowed().status(), None);
        assert_eq!(rate_limited().status(), Some(429));
        assert_eq!(Decision::Blacklisted.status(), Some(403));
    }

    #[test]
    fn test_allowed_headers_describe_budget() {
        assert_eq!(
            allowed().headers(),
            vec![
                ("X-RateLimit-Limit", "10".to_string()),
                ("X-RateLimit-Remaining", "7".to_string()),
                ("X-RateLimit-Reset", "1700000060".to_string()),
            ]
        );
    }

    #[test]
    fn test_rate_limited_headers_pin_remaining_to_zero() {
        let headers = rate_limited().headers();
        assert_eq!(headers[0], ("Retry-After", "42".to_string()));
        assert!(headers.contains(&("X-RateLimit-Remaining", "0".to_string())));
        assert!(headers.contains(&("X-RateLimit-Reset", "1700000060".to_string())));
    }

    #[test]
    fn test_blacklisted_carries_no_headers() {
        assert!(Decision::Blacklisted.headers().is_empty());
    }

    #[test]
    fn test_bodies() {
        assert_eq!(allowed().body(), None);
        assert_eq!(
            rate_limited().body(),
            Some("Too many requests, please try again later.")
        );
        assert_eq!(
            Decision::Blacklisted.body(),
            Some(r#"{"error":"Access denied due to repeated rate limit violations"}"#)
        );
    }
}
