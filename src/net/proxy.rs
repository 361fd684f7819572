//! Proxy route resolution.
//!
//! The relay covers both schemes. An explicit `http` or `https` proxy
//! replaces it for that scheme only; nothing is chained.

use url::Url;

use crate::config::{AuthConfig, ProxyConfig};
use crate::http::ProbeError;

/// Effective proxy per target scheme. `None` means direct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProxyRoutes {
    pub http: Option<Url>,
    pub https: Option<Url>,
}

impl ProxyRoutes {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ProbeError> {
        let relay = config.relay.as_deref().map(parse_proxy_url).transpose()?;
        let http = config.http.as_deref().map(parse_proxy_url).transpose()?;
        let https = config.https.as_deref().map(parse_proxy_url).transpose()?;

        Ok(Self {
            http: http.or_else(|| relay.clone()),
            https: https.or(relay),
        })
    }

    pub fn is_direct(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }

    /// Client proxies for these routes, with proxy-scoped credentials attached.
    pub fn to_reqwest(&self, auth: Option<&AuthConfig>) -> Result<Vec<reqwest::Proxy>, ProbeError> {
        let mut proxies = Vec::new();

        if let Some(url) = &self.http {
            proxies.push(with_auth(reqwest::Proxy::http(url.as_str()), url, auth)?);
        }
        if let Some(url) = &self.https {
            proxies.push(with_auth(reqwest::Proxy::https(url.as_str()), url, auth)?);
        }

        Ok(proxies)
    }
}

fn with_auth(
    proxy: reqwest::Result<reqwest::Proxy>,
    url: &Url,
    auth: Option<&AuthConfig>,
) -> Result<reqwest::Proxy, ProbeError> {
    let proxy = proxy.map_err(|e| ProbeError::Proxy {
        url: redact(url),
        reason: e.to_string(),
    })?;

    Ok(match auth {
        Some(auth) => proxy.basic_auth(&auth.username, &auth.password),
        None => proxy,
    })
}

fn parse_proxy_url(value: &str) -> Result<Url, ProbeError> {
    Url::parse(value).map_err(|e| ProbeError::Proxy {
        url: value.to_string(),
        reason: e.to_string(),
    })
}

/// Render a URL for logs with any embedded password masked.
pub fn redact(url: &Url) -> String {
    if url.password().is_none() {
        return url.to_string();
    }
    let mut masked = url.clone();
    // Only fails for URLs that cannot carry credentials in the first place.
    let _ = masked.set_password(Some("****"));
    masked.to_string()
}
