//! Fixed-window admission limiter keyed by client identifier.
//!
//! Each client gets a counter that starts with its first admitted request
//! and lives for exactly one window. While the window is open at most
//! `limit` requests are admitted; the rest are denied with the full window
//! length as the retry hint. Counters are reclaimed by a single background
//! task once their window elapses, so abandoned clients do not accumulate.
//!
//! The client table is a [`DashMap`]: denials of a saturated client only
//! take a shard read lock, while admission and counter creation take the
//! shard write lock. Operations on different clients rarely contend.

use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

/// Requests admitted per window when not configured otherwise.
pub const DEFAULT_REQUESTS_PER_WINDOW: u32 = 20;
/// Window length when not configured otherwise.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);
/// Longest accepted window.
pub const MAX_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Rejected limiter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LimiterConfigError {
    #[error("admission window must be longer than zero")]
    ZeroWindow,
    #[error("admission window {window:?} exceeds the maximum of {max:?}")]
    WindowTooLong { window: Duration, max: Duration },
}

/// Limiter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    limit: u32,
    window: Duration,
}

impl LimiterConfig {
    /// Admit at most `limit` requests per client within each `window`.
    ///
    /// # Errors
    /// Returns [`LimiterConfigError`] when `window` is zero or longer than
    /// [`MAX_WINDOW`].
    pub fn new(limit: u32, window: Duration) -> Result<Self, LimiterConfigError> {
        if window.is_zero() {
            return Err(LimiterConfigError::ZeroWindow);
        }
        if window > MAX_WINDOW {
            return Err(LimiterConfigError::WindowTooLong {
                window,
                max: MAX_WINDOW,
            });
        }
        Ok(Self { limit, window })
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_REQUESTS_PER_WINDOW,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Outcome of [`FixedWindowLimiter::allow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// The request may proceed.
    Allowed,
    /// The client must wait before retrying.
    Denied {
        /// Always the configured window length.
        retry_after: Duration,
    },
}

impl AdmissionDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Retry hint; zero for admitted requests.
    #[must_use]
    pub const fn retry_after(&self) -> Duration {
        match self {
            Self::Allowed => Duration::ZERO,
            Self::Denied { retry_after } => *retry_after,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    count: u32,
    started: Instant,
}

#[derive(Debug)]
struct ScheduledExpiry {
    client: Arc<str>,
    started: Instant,
}

type WindowTable = DashMap<Arc<str>, ClientWindow>;

/// Thread-safe fixed-window limiter.
///
/// Cloning is cheap; clones share the same client table.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use social_backend::domain::{AdmissionDecision, FixedWindowLimiter, LimiterConfig};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let config = LimiterConfig::new(1, Duration::from_secs(5)).unwrap();
/// let limiter = FixedWindowLimiter::new(config);
/// assert!(limiter.allow("10.0.0.1").is_allowed());
/// assert_eq!(
///     limiter.allow("10.0.0.1"),
///     AdmissionDecision::Denied { retry_after: Duration::from_secs(5) }
/// );
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct FixedWindowLimiter {
    config: LimiterConfig,
    windows: Arc<WindowTable>,
    expiries: mpsc::UnboundedSender<ScheduledExpiry>,
}

impl FixedWindowLimiter {
    /// Create a limiter and start its reclamation task.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn new(config: LimiterConfig) -> Self {
        let windows = Arc::new(WindowTable::new());
        let (expiries, pending) = mpsc::unbounded_channel();
        tokio::spawn(reclaim_expired(
            Arc::downgrade(&windows),
            pending,
            config.window,
        ));
        Self {
            config,
            windows,
            expiries,
        }
    }

    #[must_use]
    pub const fn config(&self) -> LimiterConfig {
        self.config
    }

    /// Decide whether `client` may proceed, counting the request if so.
    pub fn allow(&self, client: &str) -> AdmissionDecision {
        let now = Instant::now();

        if let Some(window) = self.windows.get(client) {
            if self.is_saturated(&window, now) {
                debug!(client, "admission denied");
                return self.denied();
            }
        }

        if let Some(mut window) = self.windows.get_mut(client) {
            let key = Arc::clone(window.key());
            let decision = self.admit(&mut window, now);
            drop(window);
            return self.finish(key, decision, now);
        }

        match self.windows.entry(Arc::from(client)) {
            Entry::Occupied(mut occupied) => {
                let key = Arc::clone(occupied.key());
                let decision = self.admit(occupied.get_mut(), now);
                drop(occupied);
                self.finish(key, decision, now)
            }
            Entry::Vacant(vacant) => {
                let key = Arc::clone(vacant.key());
                vacant.insert(ClientWindow {
                    count: 1,
                    started: now,
                });
                self.schedule_expiry(key, now);
                AdmissionDecision::Allowed
            }
        }
    }

    /// Number of clients with a live counter.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn is_saturated(&self, window: &ClientWindow, now: Instant) -> bool {
        window.count >= self.config.limit && !self.has_elapsed(window, now)
    }

    fn has_elapsed(&self, window: &ClientWindow, now: Instant) -> bool {
        now.saturating_duration_since(window.started) >= self.config.window
    }

    fn admit(&self, window: &mut ClientWindow, now: Instant) -> Admitted {
        if self.has_elapsed(window, now) {
            // The reclamation task has not caught up yet; start afresh.
            *window = ClientWindow {
                count: 1,
                started: now,
            };
            return Admitted::NewWindow;
        }
        if window.count < self.config.limit {
            window.count += 1;
            return Admitted::Counted;
        }
        Admitted::Refused
    }

    fn finish(&self, key: Arc<str>, admitted: Admitted, now: Instant) -> AdmissionDecision {
        match admitted {
            Admitted::NewWindow => {
                self.schedule_expiry(key, now);
                AdmissionDecision::Allowed
            }
            Admitted::Counted => AdmissionDecision::Allowed,
            Admitted::Refused => {
                debug!(client = %key, "admission denied");
                self.denied()
            }
        }
    }

    const fn denied(&self) -> AdmissionDecision {
        AdmissionDecision::Denied {
            retry_after: self.config.window,
        }
    }

    fn schedule_expiry(&self, client: Arc<str>, started: Instant) {
        // A closed channel means the runtime is shutting down; counters
        // still reset in place once their window has elapsed.
        if self
            .expiries
            .send(ScheduledExpiry { client, started })
            .is_err()
        {
            trace!("admission reclamation task has stopped");
        }
    }
}

enum Admitted {
    NewWindow,
    Counted,
    Refused,
}

/// Remove each counter once its window has elapsed.
///
/// Every window has the same length, so expiries arrive in deadline order
/// and a single sleeping task serves all clients. A counter that was reset
/// in place carries a newer start instant and is left alone; its own
/// expiry is already queued behind this one.
async fn reclaim_expired(
    windows: Weak<WindowTable>,
    mut pending: mpsc::UnboundedReceiver<ScheduledExpiry>,
    window: Duration,
) {
    while let Some(expiry) = pending.recv().await {
        let Some(deadline) = expiry.started.checked_add(window) else {
            // Unreachable deadline; the counter still resets in place.
            continue;
        };
        sleep_until(deadline).await;
        let Some(table) = windows.upgrade() else {
            break;
        };
        let removed = table
            .remove_if(&expiry.client, |_, current| {
                current.started == expiry.started
            })
            .is_some();
        if removed {
            trace!(client = %expiry.client, "admission window reclaimed");
        }
    }
}
