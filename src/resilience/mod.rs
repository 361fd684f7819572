//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Response from upstream:
//!     → retries.rs (status in forcelist? method allowed? attempts left?)
//!     → backoff.rs (exponential delay, or Retry-After)
//!     → runner sleeps, then re-issues the same request
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every request has a deadline
//! - Transport failures are reported once, never retried
//! - Policy is built once from config and never mutated

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
