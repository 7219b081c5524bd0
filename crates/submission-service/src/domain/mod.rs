//! Domain types for the submission service.
//!
//! Key validation, the acceptance window and batch processing are pure and
//! free of I/O. Header resolution reads an HTTP header map but performs no I/O.

pub mod batch;
pub mod config;
pub mod error;
pub mod headers;
pub mod keys;
pub mod retention;
pub mod validation;

// Re-exports for convenience
pub use batch::{BatchError, BatchProcessor, ProcessedBatch};
pub use config::{ConfigError, SubmissionConfig};
pub use error::{ServiceError, SubmissionError};
pub use headers::{HeaderError, SubmissionHeaders};
pub use keys::{from_submission, SubmissionPayload, TemporaryExposureKey};
pub use retention::{AcceptanceWindow, TemporalFilter};
pub use validation::{KeyValidationError, KeyValidator};
