//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a response is retryable (status in forcelist, method allowed)
//! - Compute the delay before the next attempt
//! - Honour `Retry-After` on 413/429/503 when enabled
//!
//! # Design Decisions
//! - Only HTTP status codes trigger retries; transport errors never do
//! - Attempt count includes the first request
//! - A disabled policy behaves as `max_attempts = 1`

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode};

use crate::config::RetryConfig;
use crate::resilience::backoff::{calculate_backoff, saturating_secs};

/// Statuses whose `Retry-After` header is honoured.
pub const RETRY_AFTER_STATUS: [StatusCode; 3] = [
    StatusCode::PAYLOAD_TOO_LARGE,
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::SERVICE_UNAVAILABLE,
];

/// Immutable retry policy derived from [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_factor: f64,
    backoff_max: f64,
    backoff_jitter: f64,
    status_forcelist: BTreeSet<u16>,
    methods: HashSet<Method>,
    respect_retry_after: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        let methods = config
            .methods
            .iter()
            .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
            .collect();

        Self {
            max_attempts: if config.enabled { config.max_attempts.max(1) } else { 1 },
            backoff_factor: config.backoff_factor,
            backoff_max: config.backoff_max_secs,
            backoff_jitter: config.backoff_jitter,
            status_forcelist: config.status_forcelist.iter().copied().collect(),
            methods,
            respect_retry_after: config.respect_retry_after,
        }
    }

    /// Whether `status` for `method` is eligible for another attempt.
    pub fn is_retryable(&self, method: &Method, status: StatusCode) -> bool {
        self.methods.contains(method) && self.status_forcelist.contains(&status.as_u16())
    }

    /// Whether attempt number `attempt` (1-based) should be followed by another.
    pub fn should_retry(&self, attempt: u32, method: &Method, status: StatusCode) -> bool {
        attempt < self.max_attempts && self.is_retryable(method, status)
    }

    /// Delay before retry number `retry` (1-based) after receiving `status`.
    pub fn delay_for(&self, retry: u32, status: StatusCode, headers: &HeaderMap) -> Duration {
        if self.respect_retry_after && RETRY_AFTER_STATUS.contains(&status) {
            if let Some(delay) = parse_retry_after(headers) {
                return delay.min(saturating_secs(self.backoff_max));
            }
        }
        calculate_backoff(retry, self.backoff_factor, self.backoff_max, self.backoff_jitter)
    }
}

/// Parse a `Retry-After` header given in whole seconds.
///
/// HTTP-date values are ignored and fall back to the computed backoff.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
