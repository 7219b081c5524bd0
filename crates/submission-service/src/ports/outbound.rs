//! Outbound ports for the submission service.

use async_trait::async_trait;
use thiserror::Error;

/// Failure to obtain a verdict from the verification service.
///
/// A rejected TAN is not an error; it is `Ok(false)`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TanVerificationError {
    /// Verification service answered with a status that is neither success nor 404
    #[error("verification service returned status {0}")]
    UnexpectedStatus(u16),

    /// Request did not complete
    #[error("verification request failed: {0}")]
    Transport(String),
}

/// Verifies TANs against the verification service.
#[async_trait]
pub trait TanVerifier: Send + Sync {
    /// `Ok(true)` if the TAN authorises a submission.
    async fn verify_tan(&self, tan: &str) -> Result<bool, TanVerificationError>;
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// System time implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            // Clock before Unix epoch: every key falls outside the window
            .unwrap_or(0)
    }
}
