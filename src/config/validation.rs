//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check proxy URLs and their schemes
//! - Validate value ranges (attempts >= 1, timeouts > 0, status codes)
//! - Check header names and values before they reach the client
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProbeConfig → Result<(), Vec<ValidationError>>
//! - Runs before any network I/O

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProbeConfig;

/// Proxy URL schemes the client can dial.
pub const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Upper bound for any backoff setting, in seconds.
pub const MAX_BACKOFF_SECS: f64 = u32::MAX as f64;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("proxy.{field}: invalid URL '{value}': {reason}")]
    InvalidProxyUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("proxy.{field}: unsupported scheme '{scheme}' (expected one of http, https, socks5, socks5h)")]
    UnsupportedProxyScheme { field: &'static str, scheme: String },

    #[error("proxy.auth.username must not be empty")]
    EmptyUsername,

    #[error("retries.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("retries.{field} must be between 0 and {max} seconds (got {value})", max = MAX_BACKOFF_SECS)]
    InvalidBackoff { field: &'static str, value: f64 },

    #[error("retries.status_forcelist: {0} is not an HTTP status code")]
    InvalidStatus(u16),

    #[error("retries.methods: '{0}' is not an HTTP method")]
    InvalidMethod(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("headers: invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("headers: invalid value for header '{0}'")]
    InvalidHeaderValue(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProbeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let proxy = &config.proxy;
    for (field, value) in [
        ("http", &proxy.http),
        ("https", &proxy.https),
        ("relay", &proxy.relay),
    ] {
        if let Some(value) = value {
            check_proxy_url(field, value, &mut errors);
        }
    }

    if let Some(auth) = &proxy.auth {
        if auth.username.is_empty() {
            errors.push(ValidationError::EmptyUsername);
        }
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    for (field, value) in [
        ("backoff_factor", retries.backoff_factor),
        ("backoff_max_secs", retries.backoff_max_secs),
        ("backoff_jitter", retries.backoff_jitter),
    ] {
        if !(0.0..=MAX_BACKOFF_SECS).contains(&value) {
            errors.push(ValidationError::InvalidBackoff { field, value });
        }
    }
    for &status in &retries.status_forcelist {
        if !(100..=599).contains(&status) {
            errors.push(ValidationError::InvalidStatus(status));
        }
    }
    for method in &retries.methods {
        if Method::from_bytes(method.to_ascii_uppercase().as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("connect_secs", timeouts.connect_secs),
        ("request_secs", timeouts.request_secs),
        ("upload_secs", timeouts.upload_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(field));
        }
    }

    for (name, value) in &config.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        } else if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeaderValue(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_proxy_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if !PROXY_SCHEMES.contains(&url.scheme()) => {
            errors.push(ValidationError::UnsupportedProxyScheme {
                field,
                scheme: url.scheme().to_string(),
            });
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidProxyUrl {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
