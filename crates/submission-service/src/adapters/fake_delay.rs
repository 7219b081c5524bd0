//! Delay for fake requests.
//!
//! Fake requests do no work, so answering them immediately would let an
//! observer tell them apart from real ones by latency. Each fake request is
//! held for a random duration drawn from an exponential distribution whose
//! mean tracks how long real requests take.

use crate::domain::config::FakeDelayConfig;
use parking_lot::Mutex;
use rand::Rng;
use std::time::Duration;
use tracing::trace;

/// Moving average of real request durations and the fake delay derived from it.
pub struct FakeDelayManager {
    mean_ms: Mutex<f64>,
    samples: usize,
}

impl FakeDelayManager {
    pub fn new(config: &FakeDelayConfig) -> Self {
        Self {
            mean_ms: Mutex::new(config.initial_delay.as_secs_f64() * 1_000.0),
            samples: config.moving_average_samples.max(1),
        }
    }

    /// Current mean delay.
    pub fn mean_delay(&self) -> Duration {
        Duration::from_secs_f64(*self.mean_ms.lock() / 1_000.0)
    }

    /// Fold the duration of a completed real request into the average.
    pub fn update(&self, real_request_duration: Duration) {
        let sample_ms = real_request_duration.as_secs_f64() * 1_000.0;
        let mut mean = self.mean_ms.lock();
        *mean += (sample_ms - *mean) / self.samples as f64;
        trace!(mean_ms = *mean, sample_ms, "Updated fake request delay");
    }

    /// Random delay for the next fake request.
    pub fn jittered_delay(&self) -> Duration {
        let quantile: f64 = rand::thread_rng().gen();
        self.delay_at_quantile(quantile)
    }

    /// Inverse CDF of the exponential distribution with the current mean.
    ///
    /// `quantile` must lie in `[0, 1)`.
    pub fn delay_at_quantile(&self, quantile: f64) -> Duration {
        let mean_ms = *self.mean_ms.lock();
        let delay_ms = -mean_ms * (1.0 - quantile.clamp(0.0, 1.0 - f64::EPSILON)).ln();
        Duration::from_secs_f64(delay_ms.max(0.0) / 1_000.0)
    }
}

impl Default for FakeDelayManager {
    fn default() -> Self {
        Self::new(&FakeDelayConfig::default())
    }
}
