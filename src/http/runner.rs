//! Resilient request runner.
//!
//! # Lifecycle
//! ```text
//! CONFIGURED ──execute()──▶ ATTEMPTING(1..max_attempts) ──▶ SUCCEEDED | FAILED
//! ```
//!
//! `execute` consumes the runner, so a finished run cannot be restarted.
//! Only statuses in the retry policy cause another attempt; transport
//! failures end the run immediately.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{AuthConfig, AuthScope, ProbeConfig, TimeoutConfig};
use crate::http::error::{ProbeError, ProbeResult};
use crate::http::request::{Operation, Payload};
use crate::http::response::RequestOutcome;
use crate::net::build_client;
use crate::resilience::RetryPolicy;

/// Executes one operation through the configured proxies.
pub struct Runner {
    client: Client,
    policy: RetryPolicy,
    origin_auth: Option<AuthConfig>,
    timeouts: TimeoutConfig,
    run_id: Uuid,
}

impl Runner {
    /// Build a runner from a validated configuration.
    pub fn new(config: &ProbeConfig) -> ProbeResult<Self> {
        let client = build_client(config)?;
        let origin_auth = config
            .proxy
            .auth
            .clone()
            .filter(|auth| auth.scope == AuthScope::Origin);

        Ok(Self {
            client,
            policy: RetryPolicy::from_config(&config.retries),
            origin_auth,
            timeouts: config.timeouts.clone(),
            run_id: Uuid::new_v4(),
        })
    }

    /// Run `operation` to completion and classify the result.
    pub async fn execute(self, operation: &Operation) -> RequestOutcome {
        let span = tracing::info_span!(
            "probe",
            run_id = %self.run_id,
            method = %operation.method(),
            url = %operation.url(),
        );

        async move {
            let mut attempts = 0;
            let outcome = match self.attempt(operation, &mut attempts).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(attempts, error = %e.describe(), "Request could not complete");
                    RequestOutcome::from_error(&e, attempts)
                }
            };

            if outcome.success {
                tracing::info!(status = ?outcome.status, attempts = outcome.attempts, "Request succeeded");
            } else if outcome.status.is_some() {
                tracing::warn!(status = ?outcome.status, attempts = outcome.attempts, "Request failed");
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn attempt(&self, operation: &Operation, attempts: &mut u32) -> ProbeResult<RequestOutcome> {
        let payload = operation.load_payload().await?;
        let method = operation.method();
        let timeout = self.timeout_for(operation);

        loop {
            *attempts += 1;
            let attempt = *attempts;
            tracing::debug!(attempt, bytes = payload.len(), timeout = ?timeout, "Sending request");

            let response = self
                .prepare(operation, &payload, timeout)
                .send()
                .await
                .map_err(|e| ProbeError::from_transport(e, timeout))?;
            let status = response.status();

            if self.policy.should_retry(attempt, &method, status) {
                let delay = self.policy.delay_for(attempt, status, response.headers());
                tracing::info!(attempt, status = %status, delay = ?delay, "Retrying request");
                drop(response);
                tokio::time::sleep(delay).await;
                continue;
            }

            let body = response
                .text()
                .await
                .map_err(|e| ProbeError::from_transport(e, timeout))?;
            return Ok(RequestOutcome::from_response(status, body, operation.format(), attempt));
        }
    }

    fn prepare(&self, operation: &Operation, payload: &Payload, timeout: Duration) -> RequestBuilder {
        let mut builder = self
            .client
            .request(operation.method(), operation.url().clone())
            .timeout(timeout);

        if let Some(auth) = &self.origin_auth {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }

        payload.apply(builder)
    }

    fn timeout_for(&self, operation: &Operation) -> Duration {
        if operation.is_upload() {
            Duration::from_secs(self.timeouts.upload_secs)
        } else {
            Duration::from_secs(self.timeouts.request_secs)
        }
    }
}
