//! Diagnosis key submission service.
//!
//! Accepts exposure-notification diagnosis keys from mobile clients, checks
//! that the caller holds a valid TAN, and stores the keys that are both
//! well-formed and recent enough to matter.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                       SUBMISSION SERVICE                              │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  POST /version/v1/diagnosis-keys                                     │
//! │         │                                                            │
//! │  ┌──────┴───────────────────────────────┐                            │
//! │  │  Tracing → header preconditions      │  400 on missing headers    │
//! │  └──────┬───────────────────────────────┘                            │
//! │         │                                                            │
//! │  ┌──────┴───────────────────────────────┐                            │
//! │  │  Request gate (SubmissionService)    │  fake → delayed 200        │
//! │  │   decode → validate → filter → TAN   │  400 / 403                 │
//! │  └──────┬───────────────────────────────┘                            │
//! │         │                                                            │
//! └─────────┼────────────────────────────────────────────────────────────┘
//!           ▼
//!   DiagnosisKeyRepository (key-persistence)      TanVerifier (HTTP)
//! ```
//!
//! # Response codes
//!
//! - **200**: keys accepted (also fake requests and batches whose keys were all too old)
//! - **400**: missing headers, wrong content type, undecodable body or any invalid key
//! - **403**: TAN rejected by the verification service
//! - **405**: any method other than POST on the submission path
//! - **500**: verification service or persistence failure
//!
//! # Usage
//!
//! ```ignore
//! use submission_service::{
//!     build_management_router, build_router, AppState, SubmissionConfig, SubmissionService,
//! };
//!
//! let config = SubmissionConfig::from_env();
//! let service = SubmissionService::new(&config, tan_verifier, repository)?;
//! let service = Arc::new(service);
//! let router = build_router(AppState::new(service.clone(), service.metrics(), &config));
//! let management = build_management_router(service.metrics());
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod router;
pub mod service;

// Re-exports for public API
pub use adapters::{FakeDelayManager, HttpTanVerifier};
pub use domain::batch::{BatchError, BatchProcessor, ProcessedBatch};
pub use domain::config::SubmissionConfig;
pub use domain::error::{ServiceError, SubmissionError};
pub use domain::headers::{HeaderError, SubmissionHeaders};
pub use domain::keys::{from_submission, SubmissionPayload, TemporaryExposureKey};
pub use domain::retention::{AcceptanceWindow, TemporalFilter};
pub use domain::validation::{KeyValidationError, KeyValidator};
pub use middleware::SubmissionMetrics;
pub use ports::inbound::{SubmissionApi, SubmissionOutcome};
pub use ports::outbound::{SystemTimeSource, TanVerificationError, TanVerifier, TimeSource};
pub use router::{bind_listener, build_management_router, build_router, AppState, SUBMISSION_PATH};
pub use service::SubmissionService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_submission_path() {
        assert_eq!(SUBMISSION_PATH, "/version/v1/diagnosis-keys");
    }
}
