//! Exponential backoff with optional jitter.

use rand::Rng;
use std::time::Duration;

/// Calculate the delay before retry number `retry` (1-based).
///
/// The delay is `factor * 2^(retry - 1)` seconds, capped at `max_secs`, plus
/// up to `jitter_secs` of random jitter. Retry 0 is the first attempt and
/// never waits.
pub fn calculate_backoff(retry: u32, factor_secs: f64, max_secs: f64, jitter_secs: f64) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }

    let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
    let delay = if factor_secs > 0.0 {
        (factor_secs * 2f64.powi(exponent)).min(max_secs)
    } else {
        0.0
    };

    let jitter = if jitter_secs > 0.0 {
        rand::thread_rng().gen_range(0.0..jitter_secs)
    } else {
        0.0
    };

    saturating_secs(delay + jitter)
}

/// Convert seconds to a `Duration`, clamping to `Duration::MAX` on overflow.
pub fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}
