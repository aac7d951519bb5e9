//! The throttle engine.
//!
//! Wires the ports together and implements the decision sequence: blacklist
//! check first, then fixed-window accounting, then violation tracking and
//! escalation. Decisions come back as values; the engine never touches the
//! response or a next handler.

use crate::application::metrics::Metrics;
use crate::application::ports::{Cache, Clock, EventSink, StorageError};
use crate::domain::decision::Decision;
use crate::domain::event::ThrottleEvent;
use crate::domain::records::{BlacklistMark, RequestWindow, ViolationRecord};
use crate::domain::request::RequestInfo;
use crate::domain::signature::ClientSignature;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::memory::InMemoryCache;
use crate::infrastructure::sink::TracingSink;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

/// Error returned when a [`ThrottleBuilder`] is given an invalid
/// configuration.
///
/// Raised synchronously by [`ThrottleBuilder::build`], before any request is
/// evaluated and without touching the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The limit must admit at least one request per window.
    ZeroLimit,
    /// The window must have a non-zero length.
    ZeroWindow,
    /// The blacklist threshold, when set, must require at least one violation.
    ZeroBlacklistThreshold,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroLimit => {
                write!(f, "limit must admit at least one request per window")
            }
            ConfigError::ZeroWindow => write!(f, "window length must be non-zero"),
            ConfigError::ZeroBlacklistThreshold => {
                write!(f, "blacklist threshold must require at least one violation")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Per-client request throttle with fixed windows and optional blacklist
/// escalation.
///
/// Cheap to clone: clones share the cache, clock, sink and metrics, so a
/// clone per connection or per task sees the same state.
///
/// # Examples
///
/// ```
/// use client_throttle::{RequestInfo, Throttle};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let throttle = Throttle::builder()
///     .with_limit(100)
///     .with_window(Duration::from_secs(60))
///     .build()?;
///
/// let request = RequestInfo {
///     source_address: Some("203.0.113.7".into()),
///     user_agent: "curl/8.4.0".into(),
///     method: "GET".into(),
///     path: "/api/reports".into(),
/// };
///
/// let decision = throttle.check(&request).await?;
/// assert!(decision.is_allowed());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Throttle {
    cache: Arc<dyn Cache>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    metrics: Metrics,
    limit: u32,
    window: Duration,
    blacklist_threshold: Option<u32>,
    verbose: bool,
}

impl Throttle {
    /// Default per-window limit.
    pub const DEFAULT_LIMIT: u32 = 60;

    /// Default window length.
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

    /// Create a throttle with default configuration: 60 requests per 60
    /// seconds, in-memory cache, system clock, tracing sink, no blacklisting.
    pub fn new() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        Self {
            cache: Arc::new(InMemoryCache::with_clock(Arc::clone(&clock))),
            clock,
            sink: Arc::new(TracingSink::new()),
            metrics: Metrics::new(),
            limit: Self::DEFAULT_LIMIT,
            window: Self::DEFAULT_WINDOW,
            blacklist_threshold: None,
            verbose: false,
        }
    }

    /// Start building a throttle.
    pub fn builder() -> ThrottleBuilder {
        ThrottleBuilder::default()
    }

    /// The configured per-window limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// The configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// The configured blacklist threshold, if blacklisting is enabled.
    pub fn blacklist_threshold(&self) -> Option<u32> {
        self.blacklist_threshold
    }

    /// Decision counters shared by this throttle and its clones.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Evaluate a request: derive its signature, decide, and emit events.
    ///
    /// The returned decision is exactly what [`decide`](Self::decide) would
    /// return; event emission is a side effect, never a substitute for the
    /// value. A storage failure propagates as-is so the caller can choose to
    /// fail open or fail closed.
    pub async fn check(&self, request: &RequestInfo) -> Result<Decision, StorageError> {
        let decision = self.decide(request.signature()).await?;
        self.emit_events(request, &decision);
        Ok(decision)
    }

    /// Decide whether a request from `signature` may proceed.
    ///
    /// Order of evaluation:
    /// 1. With blacklisting configured, a blacklist mark is terminal: the
    ///    request is [`Decision::Blacklisted`] and no counters are touched.
    /// 2. The window record is loaded; an absent or expired window reads as
    ///    a fresh one opening now.
    /// 3. At or over the limit, the request is denied without being counted.
    ///    With blacklisting configured the denial also records a violation,
    ///    and a violation count at or over the threshold writes the
    ///    permanent blacklist mark.
    /// 4. Otherwise the request is counted, the window persisted, and the
    ///    request admitted.
    pub async fn decide(&self, signature: ClientSignature) -> Result<Decision, StorageError> {
        let result = self.evaluate(&signature).await;
        match &result {
            Ok(Decision::Allowed { .. }) => self.metrics.record_allowed(),
            Ok(Decision::RateLimited { .. }) => self.metrics.record_limited(),
            Ok(Decision::Blacklisted) => self.metrics.record_blacklist_hit(),
            Err(_) => self.metrics.record_storage_error(),
        }
        result
    }

    async fn evaluate(&self, signature: &ClientSignature) -> Result<Decision, StorageError> {
        if self.blacklist_threshold.is_some() && self.is_blacklisted(signature).await? {
            return Ok(Decision::Blacklisted);
        }

        let now = self.epoch_now();
        let key = RequestWindow::cache_key(signature);
        let mut window = match self.cache.get(&key).await? {
            Some(bytes) => match RequestWindow::from_bytes(&bytes) {
                Some(window) if !window.is_expired(now, self.window) => window,
                // Corrupted or expired records roll over to a fresh window.
                _ => RequestWindow::fresh(now),
            },
            None => RequestWindow::fresh(now),
        };

        if window.count >= self.limit {
            let reset_at = window.reset_at(self.window);
            let retry_after = Duration::from_secs(reset_at.saturating_sub(now));
            let mut violations = None;
            let mut escalated = false;
            if let Some(threshold) = self.blacklist_threshold {
                let count = self.record_violation(signature).await?;
                if count >= threshold {
                    self.mark_blacklisted(signature, now).await?;
                    escalated = true;
                }
                violations = Some(count);
            }
            // The denied request is not counted against the window.
            return Ok(Decision::RateLimited {
                limit: self.limit,
                request_count: window.count,
                retry_after,
                reset_at,
                violations,
                escalated,
            });
        }

        window.count += 1;
        let bytes = window
            .to_bytes()
            .map_err(|err| StorageError::write(key.clone(), err))?;
        self.cache.set(&key, bytes, Some(self.window)).await?;

        Ok(Decision::Allowed {
            limit: self.limit,
            remaining: self.limit - window.count,
            reset_at: window.reset_at(self.window),
        })
    }

    async fn is_blacklisted(&self, signature: &ClientSignature) -> Result<bool, StorageError> {
        let key = BlacklistMark::cache_key(signature);
        // Presence alone means blacklisted; the payload is audit detail.
        Ok(self.cache.get(&key).await?.is_some())
    }

    async fn record_violation(&self, signature: &ClientSignature) -> Result<u32, StorageError> {
        let key = ViolationRecord::cache_key(signature);
        let previous = self
            .cache
            .get(&key)
            .await?
            .and_then(|bytes| ViolationRecord::from_bytes(&bytes));
        let record = ViolationRecord::incremented(previous);
        let bytes = record
            .to_bytes()
            .map_err(|err| StorageError::write(key.clone(), err))?;
        self.cache
            .set(&key, bytes, Some(ViolationRecord::ttl(self.window)))
            .await?;
        Ok(record.count)
    }

    async fn mark_blacklisted(
        &self,
        signature: &ClientSignature,
        now: u64,
    ) -> Result<(), StorageError> {
        let key = BlacklistMark::cache_key(signature);
        let mark = BlacklistMark { flagged_at: now };
        let bytes = mark
            .to_bytes()
            .map_err(|err| StorageError::write(key.clone(), err))?;
        self.cache.set(&key, bytes, None).await
    }

    fn emit_events(&self, request: &RequestInfo, decision: &Decision) {
        match decision {
            Decision::Allowed {
                limit, remaining, ..
            } => {
                if self.verbose {
                    self.sink.emit(&ThrottleEvent::RequestProcessed {
                        client: request.clone(),
                        request_count: limit - remaining,
                        limit: *limit,
                    });
                }
            }
            Decision::RateLimited {
                limit,
                request_count,
                reset_at,
                violations,
                escalated,
                ..
            } => {
                self.sink.emit(&ThrottleEvent::LimitExceeded {
                    client: request.clone(),
                    request_count: *request_count,
                    limit: *limit,
                    reset_at: *reset_at,
                    violations: *violations,
                });
                if *escalated {
                    if let (Some(violations), Some(threshold)) =
                        (*violations, self.blacklist_threshold)
                    {
                        self.sink.emit(&ThrottleEvent::ClientBlacklisted {
                            client: request.clone(),
                            violations,
                            threshold,
                        });
                    }
                }
            }
            Decision::Blacklisted => {
                self.sink.emit(&ThrottleEvent::BlacklistHit {
                    client: request.clone(),
                });
            }
        }
    }

    /// Current clock reading in whole seconds since the Unix epoch. A clock
    /// before the epoch reads as zero.
    fn epoch_now(&self) -> u64 {
        self.clock
            .now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Throttle`].
///
/// Unset knobs fall back to defaults: [`Throttle::DEFAULT_LIMIT`] requests
/// per [`Throttle::DEFAULT_WINDOW`], blacklisting off, verbose off, an
/// in-memory cache, the system clock, and a tracing sink.
#[derive(Debug, Default)]
pub struct ThrottleBuilder {
    limit: Option<u32>,
    window: Option<Duration>,
    blacklist_threshold: Option<u32>,
    verbose: bool,
    cache: Option<Arc<dyn Cache>>,
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn EventSink>>,
}

impl ThrottleBuilder {
    /// Set the maximum number of requests admitted per window.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the fixed window length.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    /// Enable blacklisting after `threshold` rate-limit violations.
    pub fn with_blacklist_threshold(mut self, threshold: u32) -> Self {
        self.blacklist_threshold = Some(threshold);
        self
    }

    /// Emit an informational event for every admitted request.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Use a specific cache backend.
    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use a specific clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use a specific event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validate the configuration and assemble the throttle.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the limit is zero, the window is
    /// zero-length, or a blacklist threshold of zero is requested.
    pub fn build(self) -> Result<Throttle, ConfigError> {
        let limit = self.limit.unwrap_or(Throttle::DEFAULT_LIMIT);
        let window = self.window.unwrap_or(Throttle::DEFAULT_WINDOW);

        if limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if window.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        if self.blacklist_threshold == Some(0) {
            return Err(ConfigError::ZeroBlacklistThreshold);
        }

        // The default cache follows whatever clock ends up in use, so an
        // injected mock clock drives expiry too.
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn Clock>);
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(InMemoryCache::with_clock(Arc::clone(&clock))));
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingSink::new()) as Arc<dyn EventSink>);

        Ok(Throttle {
            cache,
            clock,
            sink,
            metrics: Metrics::new(),
            limit,
            window,
            blacklist_threshold: self.blacklist_threshold,
            verbose: self.verbose,
        })
    }
}
