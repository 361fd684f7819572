//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → ConfigOverrides (CLI flags / environment)
//!     → validation.rs (semantic checks)
//!     → ProbeConfig (validated, immutable)
//!     → passed by reference to the runner
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved
//! - All fields have defaults to allow minimal configs
//! - No credentials or endpoints are compiled in
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError, ConfigOverrides};
pub use schema::AuthConfig;
pub use schema::AuthScope;
pub use schema::ProbeConfig;
pub use schema::ProxyConfig;
pub use schema::RetryConfig;
pub use schema::TimeoutConfig;
pub use schema::ObservabilityConfig;
