//! # client-throttle
//!
//! Per-client request throttling with fixed windows and automatic blacklisting.
//!
//! This crate decides, for each incoming request, whether the client behind it
//! may proceed. Clients are identified by a [`ClientSignature`] (a SHA-256 digest
//! of source address and user agent), counted against a fixed time window, and
//! optionally blacklisted for good after repeated violations. Decisions map
//! directly onto HTTP semantics (429, 403, `X-RateLimit-*` headers) but the crate
//! itself is framework-agnostic: hand it request metadata, get a [`Decision`]
//! back, and enforce it however your stack responds to requests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use client_throttle::{RequestInfo, Throttle};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Use sensible defaults: 60 requests per 60-second window, no blacklisting
//! let throttle = Throttle::new();
//!
//! // Or customize for your traffic profile:
//! let throttle = Throttle::builder()
//!     .with_limit(100)                        // 100 requests per window
//!     .with_window(Duration::from_secs(60))   // 60-second windows
//!     .with_blacklist_threshold(5)            // blacklist after 5 violations
//!     .build()?;
//!
//! let request = RequestInfo {
//!     source_address: Some("203.0.113.7".to_string()),
//!     user_agent: "curl/8.4.0".to_string(),
//!     method: "GET".to_string(),
//!     path: "/api/search".to_string(),
//! };
//!
//! let decision = throttle.check(&request).await?;
//! if let Some(status) = decision.status() {
//!     // 429 or 403: reject with the suggested status, headers, and body
//!     println!("rejecting with HTTP {status}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! ### Fixed-Window Throttling
//! - **Per-client counting**: each client signature is counted independently
//! - **Predictable quota**: the first `limit` requests of a window are admitted,
//!   the rest are denied until the window resets
//! - **Denied requests cost nothing**: a rejected request never consumes quota,
//!   so a client hammering a full window is not punished twice
//! - **No background timers**: every stored record carries its own expiry, and
//!   windows roll over lazily on the next request
//!
//! ### Automatic Blacklisting
//! - **Opt-in**: configure a violation threshold to enable it
//! - **Violation tracking**: each denied request records a violation, kept for
//!   twice the window so persistent abusers accumulate and one-off spikes age out
//! - **Permanent flag**: once the threshold is reached the client is flagged
//!   without expiry and every later request short-circuits to a 403
//!
//! ### Other Features
//! - **Pluggable storage**: in-memory by default, Redis behind a feature flag,
//!   or any backend implementing the [`Cache`] trait
//! - **Observability metrics**: built-in counters for allowed, limited, and
//!   blacklisted requests
//! - **Event stream**: structured [`ThrottleEvent`]s for every notable outcome,
//!   logged via `tracing` by default
//! - **Deterministic tests**: mock clock, capturing sink, and failing cache
//!   behind the `test-helpers` feature
//!
//! ## Client Signatures
//!
//! Clients are told apart by their **signature**: the SHA-256 digest of the
//! request's source address and user agent joined with a separator. The raw
//! identity never needs to reach the storage backend, only the digest does.
//!
//! ```rust
//! use client_throttle::ClientSignature;
//!
//! let first = ClientSignature::derive(Some("203.0.113.7"), "curl/8.4.0");
//! let second = ClientSignature::derive(Some("203.0.113.7"), "curl/8.4.0");
//! assert_eq!(first, second);
//!
//! // A missing source address hashes like an empty one
//! let proxied = ClientSignature::derive(None, "curl/8.4.0");
//! assert_eq!(proxied, ClientSignature::derive(Some(""), "curl/8.4.0"));
//! ```
//!
//! Behind a reverse proxy, make sure the address you feed in is the real client
//! address (for example from `X-Forwarded-For`), not the proxy's. Otherwise all
//! traffic shares one signature and one client can exhaust the quota for
//! everyone.
//!
//! ## Responding to Decisions
//!
//! [`Decision`] carries everything an HTTP layer needs to answer:
//!
//! | Decision | Status | Body |
//! |----------|--------|------|
//! | [`Decision::Allowed`] | none (forward the request) | none |
//! | [`Decision::RateLimited`] | 429 | [`RATE_LIMITED_BODY`] |
//! | [`Decision::Blacklisted`] | 403 | [`BLACKLISTED_BODY`] |
//!
//! Allowed and rate-limited responses also come with `X-RateLimit-Limit`,
//! `X-RateLimit-Remaining`, and `X-RateLimit-Reset` headers; rate-limited
//! responses add `Retry-After`.
//!
//! ```rust,no_run
//! # use client_throttle::{RequestInfo, Throttle};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let throttle = Throttle::new();
//! # let request = RequestInfo::default();
//! use client_throttle::Decision;
//!
//! match throttle.check(&request).await? {
//!     Decision::Allowed { remaining, .. } => {
//!         // Forward to the application; the headers expose the quota
//!         println!("{remaining} requests left in this window");
//!     }
//!     denied => {
//!         if let Some(status) = denied.status() {
//!             println!("HTTP {status}");
//!         }
//!         for (name, value) in denied.headers() {
//!             println!("{name}: {value}");
//!         }
//!         if let Some(body) = denied.body() {
//!             println!("{body}");
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Blacklisting Lifecycle
//!
//! With a threshold configured, every denied request records a violation for the
//! offending client. Violations live for twice the window, so a client has to
//! keep hitting the limit to accumulate them. Reaching the threshold writes a
//! permanent blacklist flag, and from then on the client's requests are answered
//! with [`Decision::Blacklisted`] before any counting happens.
//!
//! The flag never expires on its own. To unblock a client, delete its
//! `blacklist:` entry from the storage backend. Flags written by an earlier
//! configuration are ignored while blacklisting is disabled, so turning the
//! feature off is always safe.
//!
//! ## Storage Backends
//!
//! By default all state lives in an in-memory map ([`InMemoryCache`]), which is
//! fast and needs no setup but is local to the process: each instance of your
//! service counts on its own, and state is lost on restart. Expired entries are
//! dropped lazily when read; long-lived processes can reclaim memory with
//! [`InMemoryCache::purge_expired`].
//!
//! For multi-instance deployments enable the `redis-cache` feature and share
//! counts through Redis:
//!
//! ```rust,ignore
//! use client_throttle::{RedisCache, Throttle};
//! use std::sync::Arc;
//!
//! let cache = RedisCache::connect("redis://127.0.0.1/").await?;
//! let throttle = Throttle::builder()
//!     .with_cache(Arc::new(cache))
//!     .build()?;
//! ```
//!
//! Any other backend works too: implement [`Cache`] (two methods) and pass it
//! to the builder.
//!
//! ## When Storage Fails
//!
//! [`Throttle::check`] never invents a decision it cannot back with data. If the
//! backend errors, the error is returned as-is and the policy call is yours:
//!
//! ```rust,no_run
//! # use client_throttle::{RequestInfo, Throttle};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! # let throttle = Throttle::new();
//! # let request = RequestInfo::default();
//! match throttle.check(&request).await {
//!     Ok(decision) => { /* enforce the decision */ }
//!     Err(err) => {
//!         // Fail open: admit the request rather than take the service down
//!         // with its cache. Fail closed instead if the endpoint is sensitive.
//!         tracing::warn!(error = %err, "throttle storage unavailable");
//!     }
//! }
//! # }
//! ```
//!
//! Storage errors are counted in the metrics either way.
//!
//! ## Observability
//!
//! Monitor throttling behavior with built-in metrics:
//!
//! ```rust
//! # use client_throttle::Throttle;
//! # let throttle = Throttle::new();
//! let metrics = throttle.metrics();
//! println!("Requests allowed: {}", metrics.requests_allowed());
//! println!("Requests limited: {}", metrics.requests_limited());
//! println!("Blacklist hits: {}", metrics.blacklist_hits());
//!
//! // Get a snapshot for calculations
//! let snapshot = metrics.snapshot();
//! println!("Denial rate: {:.2}%", snapshot.denial_rate() * 100.0);
//! ```
//!
//! Every notable outcome also produces a [`ThrottleEvent`]: a warning when a
//! client exceeds its limit or a blacklisted client is blocked, an alert when a
//! client is newly blacklisted. The default [`TracingSink`] logs them through
//! the `tracing` macros at matching levels; implement [`EventSink`] to forward
//! them to an alerting pipeline instead. Builders with `.with_verbose(true)`
//! additionally emit an info event for every admitted request.
//!
//! ## Testing Your Integration
//!
//! Time is injected through the [`Clock`] trait, so tests never sleep. The
//! `test-helpers` feature exposes the same mocks this crate is tested with:
//!
//! ```rust,no_run
//! use client_throttle::infrastructure::mocks::MockClock;
//! use client_throttle::{RequestInfo, Throttle};
//! use std::sync::Arc;
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let clock = Arc::new(MockClock::new(UNIX_EPOCH + Duration::from_secs(1_700_000_000)));
//! let throttle = Throttle::builder()
//!     .with_limit(2)
//!     .with_clock(clock.clone())
//!     .build()?;
//! # let request = RequestInfo::default();
//!
//! assert!(throttle.check(&request).await?.is_allowed());
//! assert!(throttle.check(&request).await?.is_allowed());
//! assert!(throttle.check(&request).await?.is_rate_limited());
//!
//! // Jump past the window boundary; the next request starts a fresh window
//! clock.advance(Duration::from_secs(61));
//! assert!(throttle.check(&request).await?.is_allowed());
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `redis-cache` | off | Redis-backed `Cache` implementation for shared state |
//! | `test-helpers` | off | `MockClock`, `MockEventSink`, and `FailingCache` for your own tests |

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    decision::{Decision, BLACKLISTED_BODY, RATE_LIMITED_BODY},
    event::{Severity, ThrottleEvent},
    records::{BlacklistMark, RequestWindow, ViolationRecord},
    request::RequestInfo,
    signature::ClientSignature,
};

pub use application::{
    engine::{ConfigError, Throttle, ThrottleBuilder},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Cache, Clock, EventSink, StorageError},
};

pub use infrastructure::{clock::SystemClock, memory::InMemoryCache, sink::TracingSink};

#[cfg(feature = "redis-cache")]
pub use infrastructure::redis_cache::{RedisCache, RedisCacheConfig};
