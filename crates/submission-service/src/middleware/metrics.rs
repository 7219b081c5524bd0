//! Submission counters, exported as JSON on the management listener.

use crate::domain::error::SubmissionError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Submission service metrics
#[derive(Debug, Default)]
pub struct SubmissionMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub real_requests: AtomicU64,
    pub fake_requests: AtomicU64,
    pub requests_success: AtomicU64,

    // Rejections by cause
    pub header_rejections: AtomicU64,
    pub payload_rejections: AtomicU64,
    pub invalid_tans: AtomicU64,
    pub verification_failures: AtomicU64,
    pub persistence_failures: AtomicU64,

    // Keys
    pub keys_persisted: AtomicU64,
    pub keys_dropped: AtomicU64,

    // Latency of real requests only
    pub total_real_latency_ms: AtomicU64,
}

impl SubmissionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request arriving at the submission endpoint
    pub fn record_received(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that passed header preconditions
    pub fn record_request(&self, fake: bool) {
        if fake {
            self.fake_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.real_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a real submission whose keys were handed to persistence
    pub fn record_accepted(&self, persisted: usize, dropped: usize) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
        self.keys_persisted
            .fetch_add(persisted as u64, Ordering::Relaxed);
        self.keys_dropped.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    /// Record a completed fake request
    pub fn record_fake_completed(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed request under its cause
    pub fn record_failure(&self, error: &SubmissionError) {
        let counter = match error {
            SubmissionError::Header(_) => &self.header_rejections,
            SubmissionError::MalformedPayload(_) | SubmissionError::InvalidPayload(_) => {
                &self.payload_rejections
            }
            SubmissionError::TanRejected => &self.invalid_tans,
            SubmissionError::Verification(_) => &self.verification_failures,
            SubmissionError::Persistence(_) => &self.persistence_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_real_latency(&self, elapsed: Duration) {
        self.total_real_latency_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    /// Average latency of real requests in ms
    pub fn average_real_latency_ms(&self) -> f64 {
        let total = self.total_real_latency_ms.load(Ordering::Relaxed);
        let count = self.real_requests.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "real": self.real_requests.load(Ordering::Relaxed),
                "fake": self.fake_requests.load(Ordering::Relaxed),
                "success": self.requests_success.load(Ordering::Relaxed),
            },
            "rejections": {
                "headers": self.header_rejections.load(Ordering::Relaxed),
                "payload": self.payload_rejections.load(Ordering::Relaxed),
                "invalid_tan": self.invalid_tans.load(Ordering::Relaxed),
            },
            "failures": {
                "verification": self.verification_failures.load(Ordering::Relaxed),
                "persistence": self.persistence_failures.load(Ordering::Relaxed),
            },
            "keys": {
                "persisted": self.keys_persisted.load(Ordering::Relaxed),
                "dropped": self.keys_dropped.load(Ordering::Relaxed),
            },
            "latency": {
                "average_real_ms": self.average_real_latency_ms(),
            }
        })
    }
}

/// Times one real request.
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<SubmissionMetrics>,
}

impl RequestTimer {
    pub fn new(metrics: Arc<SubmissionMetrics>) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    /// Record the latency and return it.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        self.metrics.record_real_latency(elapsed);
        elapsed
    }
}
