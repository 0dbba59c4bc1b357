//! Retry policy for image requests: bounded attempts with exponential backoff.

use reqwest::{Method, StatusCode};
use std::time::Duration;

use crate::config::PipelineConfig;

/// Upper bound on any single backoff sleep.
pub const BACKOFF_MAX: Duration = Duration::from_secs(120);

/// Statuses worth another attempt: throttling and transient upstream failures.
const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub max_attempts: u32,
    /// Seconds; the delay after attempt `k` is `factor * 2^(k-1)`.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: 1.5,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_factor: config.backoff_factor.max(0.0),
        }
    }

    /// A policy that tries once and never sleeps.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff_factor: 0.0,
        }
    }

    /// Only read-only requests are replayed.
    pub fn allows_method(&self, method: &Method) -> bool {
        matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
    }

    /// Attempts granted to a request with this method.
    pub fn attempts_for(&self, method: &Method) -> u32 {
        if self.allows_method(method) {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    pub fn is_retryable_status(status: StatusCode) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    /// Sleep before the next try, after `attempt` (1-based) has failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(30) as i32;
        let secs = self.backoff_factor * 2f64.powi(exp);
        if secs.is_nan() {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(secs.clamp(0.0, BACKOFF_MAX.as_secs_f64()))
    }
}
