//! # Inbound Ports

use crate::domain::error::SubmissionError;
use crate::domain::headers::SubmissionHeaders;
use async_trait::async_trait;
use bytes::Bytes;

/// What a successful submission did. Never exposed to the client, which
/// sees the same empty 200 for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Decoy request, nothing verified or stored.
    Fake,
    /// Real request; `persisted` keys were handed to storage, `dropped`
    /// keys were outside the acceptance window.
    Accepted { persisted: usize, dropped: usize },
}

/// Entry point for one submission whose headers are already resolved.
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    async fn submit(
        &self,
        headers: SubmissionHeaders,
        body: Bytes,
    ) -> Result<SubmissionOutcome, SubmissionError>;
}
