//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Operation (GET / multipart POST)
//!     → request.rs (load payload, build request per attempt)
//!     → runner.rs (send, retry on listed statuses, read body)
//!     → response.rs (classify → RequestOutcome)
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod runner;

pub use error::{ProbeError, ProbeResult};
pub use request::{Operation, ResponseFormat, UPLOAD_FIELD};
pub use response::{RelayStatus, RequestOutcome};
pub use runner::Runner;
