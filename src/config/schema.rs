//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a probe run.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for a probe run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Proxy routes and credentials.
    pub proxy: ProxyConfig,

    /// Status-code retry policy.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Default headers attached to every request.
    pub headers: BTreeMap<String, String>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            proxy: ProxyConfig::default(),
            retries: RetryConfig::default(),
            timeouts: TimeoutConfig::default(),
            headers: default_headers(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Proxy routing configuration.
///
/// `relay` covers both schemes; `http` and `https` replace it for their
/// own scheme when set.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy for plain HTTP targets (e.g., "http://10.0.0.5:3128").
    pub http: Option<String>,

    /// Proxy for HTTPS targets.
    pub https: Option<String>,

    /// Anonymizing relay endpoint (e.g., "socks5h://127.0.0.1:9050").
    pub relay: Option<String>,

    /// Optional basic-auth credentials.
    pub auth: Option<AuthConfig>,
}

/// Basic-auth credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Where the credentials are presented.
    #[serde(default)]
    pub scope: AuthScope,
}

/// Which hop receives the basic-auth credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthScope {
    /// `Authorization` header on every request.
    #[default]
    Origin,
    /// `Proxy-Authorization` header on every proxy route.
    Proxy,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Backoff multiplier in seconds: retry `n` waits `factor * 2^(n-1)`.
    pub backoff_factor: f64,

    /// Upper bound for a single backoff delay in seconds.
    pub backoff_max_secs: f64,

    /// Random jitter added to each delay, in seconds.
    pub backoff_jitter: f64,

    /// Status codes that trigger a retry.
    pub status_forcelist: Vec<u16>,

    /// Methods eligible for retry.
    pub methods: Vec<String>,

    /// Use the server's `Retry-After` on 413/429/503 instead of the backoff.
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 4,
            backoff_factor: 1.0,
            backoff_max_secs: 120.0,
            backoff_jitter: 0.0,
            status_forcelist: vec![429, 500, 502, 503, 504],
            methods: vec!["GET".to_string(), "HEAD".to_string(), "POST".to_string()],
            respect_retry_after: true,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time for a GET check in seconds.
    pub request_secs: u64,

    /// Total time for an upload in seconds.
    pub upload_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 30,
            request_secs: 30,
            upload_secs: 120,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Browser-like header set sent when none is configured.
pub fn default_headers() -> BTreeMap<String, String> {
    [
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        ),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.8"),
        ("Accept-Encoding", "gzip, deflate"),
        ("Connection", "keep-alive"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
