//! Error definitions for a probe run.

use std::error::Error as _;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that stop a probe before a classifiable response arrives.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Proxy URL could not be turned into a route.
    #[error("invalid proxy '{url}': {reason}")]
    Proxy { url: String, reason: String },

    /// Configured header could not be encoded.
    #[error("invalid header '{0}'")]
    Header(String),

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Upload file could not be read.
    #[error("failed to read '{}'", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Request exceeded its deadline.
    #[error("request timed out after {}s", after.as_secs_f64())]
    Timeout {
        after: Duration,
        #[source]
        source: reqwest::Error,
    },

    /// Connection, DNS, proxy, or body transfer failure.
    #[error("request failed")]
    Transport(#[source] reqwest::Error),

    /// A JSON check received a body that is not JSON.
    #[error("invalid JSON body")]
    Decode(#[source] serde_json::Error),
}

impl ProbeError {
    /// Classify a client error, separating deadline expiry from other failures.
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout {
                after: timeout,
                source: err,
            }
        } else {
            ProbeError::Transport(err)
        }
    }

    /// Full description including every underlying cause.
    pub fn describe(&self) -> String {
        let mut description = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            description.push_str(": ");
            description.push_str(&cause.to_string());
            source = cause.source();
        }
        description
    }
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;
