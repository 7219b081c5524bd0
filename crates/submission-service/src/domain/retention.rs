//! Acceptance window for rolling start intervals.
//!
//! Keys whose validity began before the retention horizon, or lies in the
//! future, are dropped from the stored set. Dropping is not a validation
//! failure: the request still succeeds.

use crate::domain::config::RetentionConfig;
use crate::domain::keys::TemporaryExposureKey;

/// Length of one rolling interval in seconds.
pub const SECONDS_PER_INTERVAL: u64 = 600;

/// Rolling intervals per day.
pub const INTERVALS_PER_DAY: i64 = 144;

/// Rolling interval number containing the given Unix timestamp.
pub fn interval_number(unix_secs: u64) -> i64 {
    (unix_secs / SECONDS_PER_INTERVAL) as i64
}

/// Inclusive range `[earliest, latest]` of accepted rolling start intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceWindow {
    pub earliest: i64,
    pub latest: i64,
}

impl AcceptanceWindow {
    /// Window of `max_age_intervals` ending at `now_interval`.
    pub fn ending_at(now_interval: i64, max_age_intervals: i64) -> Self {
        Self {
            earliest: now_interval.saturating_sub(max_age_intervals),
            latest: now_interval,
        }
    }

    pub fn contains(&self, interval: i64) -> bool {
        (self.earliest..=self.latest).contains(&interval)
    }
}

/// Decides whether a key is recent enough to be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalFilter {
    max_age_intervals: i64,
}

impl TemporalFilter {
    pub fn new(max_age_intervals: i64) -> Self {
        Self { max_age_intervals }
    }

    pub fn from_config(config: &RetentionConfig) -> Self {
        Self::new(config.max_age_intervals())
    }

    pub fn max_age_intervals(&self) -> i64 {
        self.max_age_intervals
    }

    pub fn window(&self, now_interval: i64) -> AcceptanceWindow {
        AcceptanceWindow::ending_at(now_interval, self.max_age_intervals)
    }

    pub fn is_in_window(&self, key: &TemporaryExposureKey, now_interval: i64) -> bool {
        self.window(now_interval)
            .contains(i64::from(key.rolling_start_interval_number))
    }
}

impl Default for TemporalFilter {
    fn default() -> Self {
        Self::from_config(&RetentionConfig::default())
    }
}
