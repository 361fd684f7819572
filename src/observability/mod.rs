//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config / runner / resilience produce:
//!     → tracing events (structured fields)
//!     → probe span carrying the run ID
//!
//! Consumers:
//!     → stderr (fmt layer)
//! ```

pub mod logging;
