//! Submission service - the request gate behind the HTTP endpoint.
//!
//! Order of checks for one request whose headers already resolved:
//!
//! 1. fake request: wait a jittered delay, then succeed without touching
//!    the body, the verification service or storage
//! 2. decode the protobuf body (400)
//! 3. validate every key, then drop keys outside the acceptance window (400)
//! 4. verify the TAN (403, or 500 if the verification service fails)
//! 5. hand the accepted keys to persistence exactly once (500 on failure)
//!
//! The body is checked before the TAN because verification consumes it.

use crate::adapters::FakeDelayManager;
use crate::domain::batch::BatchProcessor;
use crate::domain::config::SubmissionConfig;
use crate::domain::error::{ServiceError, SubmissionError};
use crate::domain::headers::SubmissionHeaders;
use crate::domain::keys::SubmissionPayload;
use crate::domain::retention::{interval_number, TemporalFilter};
use crate::middleware::{RequestTimer, SubmissionMetrics};
use crate::ports::inbound::{SubmissionApi, SubmissionOutcome};
use crate::ports::outbound::{SystemTimeSource, TanVerifier, TimeSource};
use crate::ports::DiagnosisKeyRepository;
use async_trait::async_trait;
use bytes::Bytes;
use prost::Message;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Diagnosis key submission service
pub struct SubmissionService {
    processor: BatchProcessor,
    tan_verifier: Arc<dyn TanVerifier>,
    repository: Arc<dyn DiagnosisKeyRepository>,
    time_source: Arc<dyn TimeSource>,
    fake_delay: Arc<FakeDelayManager>,
    metrics: Arc<SubmissionMetrics>,
}

impl SubmissionService {
    /// Create a service reading the system clock.
    pub fn new(
        config: &SubmissionConfig,
        tan_verifier: Arc<dyn TanVerifier>,
        repository: Arc<dyn DiagnosisKeyRepository>,
    ) -> Result<Self, ServiceError> {
        Self::with_time_source(config, tan_verifier, repository, Arc::new(SystemTimeSource))
    }

    /// Create a service with an explicit clock.
    pub fn with_time_source(
        config: &SubmissionConfig,
        tan_verifier: Arc<dyn TanVerifier>,
        repository: Arc<dyn DiagnosisKeyRepository>,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;

        Ok(Self {
            processor: BatchProcessor::from_config(
                &config.payload,
                TemporalFilter::from_config(&config.retention),
            ),
            tan_verifier,
            repository,
            time_source,
            fake_delay: Arc::new(FakeDelayManager::new(&config.fake_delay)),
            metrics: Arc::new(SubmissionMetrics::new()),
        })
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<SubmissionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn fake_delay(&self) -> &FakeDelayManager {
        &self.fake_delay
    }

    async fn submit_fake(&self) -> SubmissionOutcome {
        let delay = self.fake_delay.jittered_delay();
        debug!(delay_ms = delay.as_millis() as u64, "Fake submission");
        tokio::time::sleep(delay).await;
        self.metrics.record_fake_completed();
        SubmissionOutcome::Fake
    }

    async fn submit_real(&self, tan: &str, body: Bytes) -> Result<SubmissionOutcome, SubmissionError> {
        let payload = SubmissionPayload::decode(body)?;
        let submitted = payload.keys.len();

        let now_interval = interval_number(self.time_source.now());
        let batch = self.processor.process(payload.keys, now_interval)?;

        if !self.tan_verifier.verify_tan(tan).await? {
            warn!("TAN rejected by verification service");
            return Err(SubmissionError::TanRejected);
        }

        let persisted = batch.accepted.len();
        self.repository.save_diagnosis_keys(batch.accepted).await?;
        self.metrics.record_accepted(persisted, batch.dropped);

        info!(
            submitted,
            persisted,
            dropped = batch.dropped,
            "Diagnosis keys accepted"
        );

        Ok(SubmissionOutcome::Accepted {
            persisted,
            dropped: batch.dropped,
        })
    }
}

#[async_trait]
impl SubmissionApi for SubmissionService {
    async fn submit(
        &self,
        headers: SubmissionHeaders,
        body: Bytes,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        self.metrics.record_request(headers.fake);

        if headers.fake {
            return Ok(self.submit_fake().await);
        }

        let timer = RequestTimer::new(Arc::clone(&self.metrics));
        let result = self.submit_real(&headers.tan, body).await;
        // fake delays track every real request, failed ones included
        self.fake_delay.update(timer.finish());

        if let Err(e) = &result {
            debug!(error = %e, code = e.code(), "Submission failed");
        }
        result
    }
}
