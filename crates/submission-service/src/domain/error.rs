//! Submission error types.
//!
//! `SubmissionError` is what a single request can fail with; the router maps
//! each variant to an HTTP status. `ServiceError` covers startup and wiring.

use crate::domain::batch::BatchError;
use crate::domain::config::ConfigError;
use crate::domain::headers::HeaderError;
use crate::ports::outbound::TanVerificationError;
use key_persistence::PersistenceError;
use thiserror::Error;

/// Failure of one submission request
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Missing or malformed precondition headers (400)
    #[error("invalid headers: {0}")]
    Header(#[from] HeaderError),

    /// Body could not be read or decoded (400)
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A key failed validation or the batch is too large (400)
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] BatchError),

    /// The verification service rejected the TAN (403)
    #[error("TAN rejected")]
    TanRejected,

    /// The verification service could not be asked (500)
    #[error("TAN verification unavailable: {0}")]
    Verification(#[from] TanVerificationError),

    /// Accepted keys could not be stored (500)
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

impl SubmissionError {
    /// Short machine-readable code used in error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionError::Header(_) => "invalid_headers",
            SubmissionError::MalformedPayload(_) => "malformed_payload",
            SubmissionError::InvalidPayload(_) => "invalid_payload",
            SubmissionError::TanRejected => "tan_rejected",
            SubmissionError::Verification(_) => "verification_unavailable",
            SubmissionError::Persistence(_) => "persistence_failed",
        }
    }

    /// Whether the client caused the failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            SubmissionError::Verification(_) | SubmissionError::Persistence(_)
        )
    }
}

impl From<prost::DecodeError> for SubmissionError {
    fn from(e: prost::DecodeError) -> Self {
        SubmissionError::MalformedPayload(e.to_string())
    }
}

/// Service-level errors (not per request)
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}
