//! Network subsystem.
//!
//! # Data Flow
//! ```text
//! ProbeConfig
//!     → proxy.rs (relay + per-scheme overrides → ProxyRoutes)
//!     → client.rs (headers, timeouts, proxies → reqwest::Client)
//!     → http::runner (one logical request)
//! ```
//!
//! # Design Decisions
//! - Remote DNS through the relay (`socks5h`) so relay-only hosts resolve
//! - One client per run; connections are not pooled
//! - Environment proxy variables are never consulted

pub mod client;
pub mod proxy;

pub use client::build_client;
pub use proxy::ProxyRoutes;
