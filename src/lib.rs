//! Single-shot HTTP checks through anonymizing relays and forward proxies.

pub mod config;
pub mod http;
pub mod net;
pub mod observability;
pub mod resilience;

pub use config::ProbeConfig;
pub use http::{Operation, RequestOutcome, Runner};
pub use resilience::RetryPolicy;
