//! proxy-probe
//!
//! Operational checks that issue exactly one logical HTTP request through
//! an anonymizing relay and/or a forward proxy, then exit with status 0 on
//! success and 1 on failure.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI / env ──┐
//!   TOML file ──┴─▶ config ──▶ net::client ──▶ http::runner ──▶ report + exit code
//!                                  │                 │
//!                        relay / forward proxy   resilience (retry + backoff)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

use proxy_probe::config::{resolve_config, AuthScope, ConfigOverrides, ProbeConfig};
use proxy_probe::http::{Operation, RequestOutcome, Runner};
use proxy_probe::observability::logging;

/// Exit status for unusable configuration, matching clap's usage errors.
const CONFIG_EXIT_STATUS: u8 = 2;

#[derive(Parser)]
#[command(name = "proxy-probe", version)]
#[command(about = "Single-shot HTTP checks through relay and forward proxies", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "PROXY_PROBE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Relay for both schemes (e.g., socks5h://127.0.0.1:9050)
    #[arg(long, env = "PROXY_PROBE_RELAY", value_name = "URL")]
    relay: Option<String>,

    /// Proxy for http:// targets, replacing the relay
    #[arg(long, env = "PROXY_PROBE_HTTP_PROXY", value_name = "URL")]
    http_proxy: Option<String>,

    /// Proxy for https:// targets, replacing the relay
    #[arg(long, env = "PROXY_PROBE_HTTPS_PROXY", value_name = "URL")]
    https_proxy: Option<String>,

    /// Basic-auth username
    #[arg(short, long, env = "PROXY_PROBE_USER")]
    user: Option<String>,

    /// Basic-auth password
    #[arg(long, env = "PROXY_PROBE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Present credentials to the target or to the proxy
    #[arg(long, value_enum)]
    auth_scope: Option<ScopeArg>,

    /// Request timeout in seconds [default: 30, uploads 120]
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Maximum attempts including the first request
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Backoff multiplier in seconds
    #[arg(long)]
    backoff_factor: Option<f64>,

    /// Disable status-code retries
    #[arg(long)]
    no_retry: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PROXY_PROBE_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Origin,
    Proxy,
}

impl From<ScopeArg> for AuthScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Origin => AuthScope::Origin,
            ScopeArg::Proxy => AuthScope::Proxy,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Report the egress IP seen by a remote echo service
    Ip {
        #[arg(long, default_value = "https://ifconfig.me")]
        url: Url,
    },
    /// Check that traffic leaves through the anonymizing relay
    RelayCheck {
        #[arg(long, default_value = "https://check.torproject.org/api/ip")]
        url: Url,
    },
    /// GET an arbitrary URL and print the body
    Get { url: Url },
    /// Upload one file as multipart form data (field "file")
    Upload {
        path: PathBuf,

        #[arg(long)]
        url: Url,
    },
}

impl Commands {
    fn operation(&self) -> Operation {
        match self {
            Commands::Ip { url } | Commands::Get { url } => Operation::get(url.clone()),
            Commands::RelayCheck { url } => Operation::get_json(url.clone()),
            Commands::Upload { path, url } => Operation::upload(url.clone(), path.clone()),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Commands::Ip { .. } => "Egress IP check",
            Commands::RelayCheck { .. } => "Relay check",
            Commands::Get { .. } => "Request",
            Commands::Upload { .. } => "Upload",
        }
    }
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            relay: self.relay.clone(),
            http_proxy: self.http_proxy.clone(),
            https_proxy: self.https_proxy.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
            auth_scope: self.auth_scope.map(Into::into),
            timeout_secs: self.timeout,
            max_attempts: self.max_attempts,
            backoff_factor: self.backoff_factor,
            disable_retries: self.no_retry,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match configure(&cli) {
        Ok(config) => config,
        Err(status) => return ExitCode::from(status),
    };

    logging::init(&config.observability);
    tracing::debug!(
        relay = config.proxy.relay.is_some(),
        http_proxy = config.proxy.http.is_some(),
        https_proxy = config.proxy.https.is_some(),
        max_attempts = config.retries.max_attempts,
        "Configuration resolved"
    );

    let operation = cli.command.operation();
    let outcome = match Runner::new(&config) {
        Ok(runner) => runner.execute(&operation).await,
        Err(e) => RequestOutcome::from_error(&e, 0),
    };

    report(&cli.command, &outcome);
    outcome.exit_code()
}

/// Resolve the effective configuration, or the exit status to stop with.
fn configure(cli: &Cli) -> Result<ProbeConfig, u8> {
    resolve_config(cli.config.as_deref(), cli.overrides()).map_err(|e| {
        eprintln!("Configuration error: {}", e);
        CONFIG_EXIT_STATUS
    })
}

/// Print the operator-facing result. Successes go to stdout, failures to stderr.
fn report(command: &Commands, outcome: &RequestOutcome) {
    match render(command, outcome) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(line) => eprintln!("{}", line),
    }
}

/// Stdout lines for a success, or the single stderr line for a failure.
fn render(command: &Commands, outcome: &RequestOutcome) -> Result<Vec<String>, String> {
    let label = command.label();
    let body = outcome.body.as_deref().unwrap_or_default();

    if !outcome.success {
        return Err(match (&outcome.error, outcome.status) {
            (None, Some(status)) => format!("{} failed with status code {}: {}", label, status, body),
            _ => format!(
                "{} failed: {}",
                label,
                outcome.failure_message().unwrap_or_default()
            ),
        });
    }

    let lines = match command {
        Commands::Ip { .. } => vec![format!("Success! IP: {}", body.trim())],
        Commands::Get { .. } => vec![body.to_string()],
        Commands::Upload { .. } => vec![format!("File uploaded successfully: {}", body)],
        Commands::RelayCheck { .. } => {
            let mut lines = Vec::new();
            if let Some(content) = &outcome.content {
                lines.push(serde_json::to_string_pretty(content).unwrap_or_else(|_| body.to_string()));
            }
            match outcome.relay_status() {
                Some(status) if status.is_tor => lines.push(format!(
                    "Traffic is routed through the relay (exit IP {})",
                    status.ip.as_deref().unwrap_or("unknown")
                )),
                Some(_) => {
                    tracing::warn!("Relay check endpoint reports a direct connection");
                    lines.push("Traffic is NOT routed through the relay".to_string());
                }
                None => {}
            }
            lines
        }
    };
    Ok(lines)
}
