use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{ErrorKind, Result};

/// Default number of calls dispatched per window
const DEFAULT_LIMIT: usize = 120;

/// Default length of a rate window
const DEFAULT_INTERVAL: Duration = Duration::from_millis(60_000);

/// Default number of queued calls in flight while draining
const DEFAULT_DRAIN_CONCURRENCY: usize = 1;

/// What to do with a new call when the pending queue is at `max_pending`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Reject the incoming call, leaving the queue untouched
    #[default]
    RejectNew,
    /// Evict and reject the call at the head of the queue, then enqueue the
    /// incoming one
    RejectOldest,
}

/// Rate ceiling configuration for a [`crate::Governor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Maximum number of calls dispatched per window
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Length of a window, e.g. `"60s"` or `"500ms"`
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// How many queued calls may be in flight at once while a reset drains
    /// the pending queue
    #[serde(default = "default_drain_concurrency")]
    pub drain_concurrency: usize,

    /// Upper bound for the pending queue. Unbounded if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pending: Option<usize>,

    /// Policy applied once `max_pending` is reached
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            interval: default_interval(),
            drain_concurrency: default_drain_concurrency(),
            max_pending: None,
            overflow: OverflowPolicy::default(),
        }
    }
}

const fn default_limit() -> usize {
    DEFAULT_LIMIT
}

const fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

const fn default_drain_concurrency() -> usize {
    DEFAULT_DRAIN_CONCURRENCY
}

impl RateLimitConfig {
    /// Create a config with the given ceiling and window, keeping the
    /// defaults for everything else
    #[must_use]
    pub fn new(limit: usize, interval: Duration) -> Self {
        Self {
            limit,
            interval,
            ..Self::default()
        }
    }

    /// Bound the pending queue
    #[must_use]
    pub const fn with_max_pending(mut self, max_pending: usize, overflow: OverflowPolicy) -> Self {
        self.max_pending = Some(max_pending);
        self.overflow = overflow;
        self
    }

    /// Set how many queued calls may be in flight while draining
    #[must_use]
    pub const fn with_drain_concurrency(mut self, drain_concurrency: usize) -> Self {
        self.drain_concurrency = drain_concurrency;
        self
    }

    /// Check that the values can drive a governor.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidRateLimit`] for a zero limit, interval,
    /// drain concurrency or queue bound.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(ErrorKind::InvalidRateLimit(
                "limit must be at least 1".into(),
            ));
        }
        if self.interval.is_zero() {
            return Err(ErrorKind::InvalidRateLimit(
                "interval must be longer than zero".into(),
            ));
        }
        if self.drain_concurrency == 0 {
            return Err(ErrorKind::InvalidRateLimit(
                "drain_concurrency must be at least 1".into(),
            ));
        }
        if self.max_pending == Some(0) {
            return Err(ErrorKind::InvalidRateLimit(
                "max_pending must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}
