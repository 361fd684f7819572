//! Outcome classification.
//!
//! 200 and 201 are the only successful statuses. Everything else, and any
//! error before a response is read, is a failure with exit status 1.

use std::process::ExitCode;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::http::error::ProbeError;
use crate::http::request::ResponseFormat;

/// Exit status reported for any failed run.
pub const FAILURE_EXIT_STATUS: u8 = 1;

/// Result of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub success: bool,
    /// Final HTTP status, if a response was received.
    pub status: Option<u16>,
    /// Final response body, if one was read.
    pub body: Option<String>,
    /// Decoded body for JSON checks.
    pub content: Option<serde_json::Value>,
    /// Why the request could not complete.
    pub error: Option<String>,
    /// Requests sent, including retries.
    pub attempts: u32,
}

/// Document returned by a relay check endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayStatus {
    #[serde(rename = "IsTor")]
    pub is_tor: bool,
    #[serde(rename = "IP")]
    pub ip: Option<String>,
}

pub fn is_success_status(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::CREATED)
}

impl RequestOutcome {
    /// Classify a final response.
    pub fn from_response(
        status: StatusCode,
        body: String,
        format: ResponseFormat,
        attempts: u32,
    ) -> Self {
        let mut outcome = Self {
            success: is_success_status(status),
            status: Some(status.as_u16()),
            body: None,
            content: None,
            error: None,
            attempts,
        };

        if outcome.success && format == ResponseFormat::Json {
            match serde_json::from_str(&body) {
                Ok(value) => outcome.content = Some(value),
                Err(e) => {
                    outcome.success = false;
                    outcome.error = Some(ProbeError::Decode(e).describe());
                }
            }
        }

        outcome.body = Some(body);
        outcome
    }

    /// Record a run that ended without a classifiable response.
    pub fn from_error(error: &ProbeError, attempts: u32) -> Self {
        Self {
            success: false,
            status: None,
            body: None,
            content: None,
            error: Some(error.describe()),
            attempts,
        }
    }

    pub fn exit_status(&self) -> u8 {
        if self.success {
            0
        } else {
            FAILURE_EXIT_STATUS
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Interpret the decoded body as a relay check document.
    pub fn relay_status(&self) -> Option<RelayStatus> {
        self.content
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// One-line description of a failure, `None` on success.
    pub fn failure_message(&self) -> Option<String> {
        if self.success {
            return None;
        }
        Some(match (&self.error, self.status) {
            (Some(error), _) => error.clone(),
            (None, Some(status)) => format!(
                "status code {}: {}",
                status,
                self.body.as_deref().unwrap_or_default()
            ),
            (None, None) => "request did not complete".to_string(),
        })
    }
}
