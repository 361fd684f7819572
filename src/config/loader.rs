//! Configuration loading from disk and the command line.

use std::fs;
use std::path::Path;

use crate::config::schema::{AuthConfig, AuthScope, ProbeConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings supplied on the command line or through the environment.
///
/// Every `Some` replaces the corresponding file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub relay: Option<String>,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth_scope: Option<AuthScope>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub backoff_factor: Option<f64>,
    pub disable_retries: bool,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    /// Apply the overrides on top of `config`.
    pub fn apply(self, config: &mut ProbeConfig) {
        if let Some(relay) = self.relay {
            config.proxy.relay = Some(relay);
        }
        if let Some(http) = self.http_proxy {
            config.proxy.http = Some(http);
        }
        if let Some(https) = self.https_proxy {
            config.proxy.https = Some(https);
        }

        if let Some(username) = self.username {
            let existing = config.proxy.auth.take();
            config.proxy.auth = Some(AuthConfig {
                username,
                password: existing.as_ref().map(|a| a.password.clone()).unwrap_or_default(),
                scope: existing.map(|a| a.scope).unwrap_or_default(),
            });
        }
        if let Some(auth) = config.proxy.auth.as_mut() {
            if let Some(password) = self.password {
                auth.password = password;
            }
            if let Some(scope) = self.auth_scope {
                auth.scope = scope;
            }
        }

        if let Some(secs) = self.timeout_secs {
            config.timeouts.request_secs = secs;
            config.timeouts.upload_secs = secs;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.retries.max_attempts = max_attempts;
        }
        if let Some(factor) = self.backoff_factor {
            config.retries.backoff_factor = factor;
        }
        if self.disable_retries {
            config.retries.enabled = false;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

/// Load configuration from a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<ProbeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Build the effective configuration: defaults, then the optional file,
/// then overrides. Validation runs once on the merged result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<ProbeConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProbeConfig::default(),
    };
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
