//! HTTP client construction.
//!
//! # Responsibilities
//! - Attach the configured default headers
//! - Install proxy routes (relay and per-scheme overrides)
//! - Apply the connect timeout
//! - Ignore proxy settings from the process environment

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use crate::config::{AuthScope, ProbeConfig};
use crate::http::ProbeError;
use crate::net::proxy::{redact, ProxyRoutes};

/// Build the client used for every attempt of a run.
pub fn build_client(config: &ProbeConfig) -> Result<Client, ProbeError> {
    let headers = build_headers(&config.headers)?;
    let routes = ProxyRoutes::from_config(&config.proxy)?;
    let proxy_auth = config
        .proxy
        .auth
        .as_ref()
        .filter(|auth| auth.scope == AuthScope::Proxy);

    let mut builder = Client::builder()
        .no_proxy()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
        .pool_max_idle_per_host(0); // One logical request per run

    for proxy in routes.to_reqwest(proxy_auth)? {
        builder = builder.proxy(proxy);
    }

    if routes.is_direct() {
        tracing::debug!("No proxy configured, connecting directly");
    } else {
        tracing::debug!(
            http = routes.http.as_ref().map(redact).as_deref().unwrap_or("direct"),
            https = routes.https.as_ref().map(redact).as_deref().unwrap_or("direct"),
            proxy_auth = proxy_auth.is_some(),
            "Proxy routes installed"
        );
    }

    builder.build().map_err(ProbeError::Client)
}

/// Convert the configured header table into a header map.
pub fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ProbeError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| ProbeError::Header(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ProbeError::Header(name.clone()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
