use serde::Serialize;
use std::time::Instant;

use super::transport::Attempt;

/// Record and report statistics for a [`crate::Governor`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct GovernorStats {
    /// Total number of HTTP exchanges, retries included
    pub dispatched: u64,
    /// Exchanges that ended with a status below 400
    pub succeeded: u64,
    /// Exchanges answered with 429
    pub rate_limited: u64,
    /// Exchanges answered with a 4xx status other than 429
    pub client_errors: u64,
    /// Exchanges answered with a 5xx status
    pub server_errors: u64,
    /// Calls that failed without an HTTP status
    pub transport_failures: u64,
    /// Number of window resets since the governor started
    pub resets: u64,
    /// Calls rejected because the pending queue was full
    pub rejected: u64,
    /// Calls waiting for a slot when the snapshot was taken
    pub pending: usize,
    /// Slots used in the current window when the snapshot was taken
    pub window_count: usize,
    /// Timestamp of the last successful exchange
    #[serde(skip)]
    pub last_success: Option<Instant>,
    /// Timestamp of the last 429
    #[serde(skip)]
    pub last_rate_limit: Option<Instant>,
}

impl GovernorStats {
    /// Record the result of one exchange
    pub fn record_attempt(&mut self, attempt: &Attempt) {
        self.dispatched += 1;

        match attempt {
            Attempt::Throttled => {
                self.rate_limited += 1;
                self.last_rate_limit = Some(Instant::now());
            }
            Attempt::Settled(Ok(_)) => {
                self.succeeded += 1;
                self.last_success = Some(Instant::now());
            }
            Attempt::Settled(Err(e)) => match e.status() {
                Some(500..) => self.server_errors += 1,
                Some(_) => self.client_errors += 1,
                // 422 is the only status that surfaces without a code
                None if matches!(e, crate::ApiError::Validation { .. }) => {
                    self.client_errors += 1;
                }
                None => self.transport_failures += 1,
            },
        }
    }

    /// Get the current success rate (0.0 to 1.0)
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.dispatched == 0 {
            1.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let success_rate = self.succeeded as f64 / self.dispatched as f64;
            success_rate
        }
    }

    /// Get error rate (percentage), throttling included
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        if self.dispatched == 0 {
            return 0.0;
        }
        let errors =
            self.rate_limited + self.client_errors + self.server_errors + self.transport_failures;
        #[allow(clippy::cast_precision_loss)]
        let error_rate = errors as f64 / self.dispatched as f64;
        error_rate * 100.0
    }

    /// Check if the API has throttled us within the given window
    #[must_use]
    pub fn rate_limited_within(&self, window: std::time::Duration) -> bool {
        self.last_rate_limit
            .is_some_and(|last| last.elapsed() < window)
    }
}
