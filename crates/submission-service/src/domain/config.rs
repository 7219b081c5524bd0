//! Submission service configuration with validation.
//!
//! Defaults match the production deployment; every value can be overridden
//! from the environment via [`SubmissionConfig::apply_env_overrides`].

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::retention::INTERVALS_PER_DAY;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Public HTTP server configuration
    pub http: HttpConfig,
    /// Management listener serving health and metrics
    pub management: ManagementConfig,
    /// Payload limits and key validation bounds
    pub payload: PayloadConfig,
    /// Acceptance window for rolling start intervals
    pub retention: RetentionConfig,
    /// TAN verification service
    pub verification: VerificationConfig,
    /// Delay applied to fake requests
    pub fake_delay: FakeDelayConfig,
    /// Key store limits
    pub storage: StorageConfig,
}

impl SubmissionConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.payload.max_number_of_keys == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_number_of_keys cannot be 0".into(),
            ));
        }

        if self.payload.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if self.payload.min_transmission_risk_level > self.payload.max_transmission_risk_level {
            return Err(ConfigError::InvalidRiskRange {
                min: self.payload.min_transmission_risk_level,
                max: self.payload.max_transmission_risk_level,
            });
        }

        if self.retention.retention_days == 0 {
            return Err(ConfigError::Invalid("retention_days cannot be 0".into()));
        }

        if self.verification.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "verification base_url cannot be empty".into(),
            ));
        }

        if self.verification.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "verification timeout cannot be 0".into(),
            ));
        }

        if self.http_addr() == self.management_addr() {
            return Err(ConfigError::Invalid(
                "management listener must not share the public address".into(),
            ));
        }

        if self.storage.max_stored_keys == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_stored_keys cannot be 0".into(),
            ));
        }

        if self.fake_delay.moving_average_samples == 0 {
            return Err(ConfigError::InvalidLimit(
                "moving_average_samples cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Get management listener bind address
    pub fn management_addr(&self) -> SocketAddr {
        SocketAddr::new(self.management.host, self.management.port)
    }

    /// Override values from `SUBMISSION_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(host) = env_parse("SUBMISSION_HTTP_HOST") {
            self.http.host = host;
        }
        if let Some(port) = env_parse("SUBMISSION_HTTP_PORT") {
            self.http.port = port;
        }
        if let Some(host) = env_parse("SUBMISSION_MANAGEMENT_HOST") {
            self.management.host = host;
        }
        if let Some(port) = env_parse("SUBMISSION_MANAGEMENT_PORT") {
            self.management.port = port;
        }
        if let Some(max_stored) = env_parse("SUBMISSION_MAX_STORED_KEYS") {
            self.storage.max_stored_keys = max_stored;
        }
        if let Some(max_keys) = env_parse("SUBMISSION_MAX_NUMBER_OF_KEYS") {
            self.payload.max_number_of_keys = max_keys;
        }
        if let Some(max_size) = env_parse("SUBMISSION_MAX_REQUEST_SIZE") {
            self.payload.max_request_size = max_size;
        }
        if let Some(max_risk) = env_parse("SUBMISSION_MAX_TRANSMISSION_RISK_LEVEL") {
            self.payload.max_transmission_risk_level = max_risk;
        }
        if let Some(days) = env_parse("SUBMISSION_RETENTION_DAYS") {
            self.retention.retention_days = days;
        }
        if let Ok(url) = std::env::var("SUBMISSION_VERIFICATION_URL") {
            info!(url = %url, "Using TAN verification service from environment");
            self.verification.base_url = url;
        }
        if let Ok(raw) = std::env::var("SUBMISSION_VERIFICATION_TIMEOUT") {
            match humantime::parse_duration(&raw) {
                Ok(timeout) => self.verification.timeout = timeout,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring SUBMISSION_VERIFICATION_TIMEOUT"),
            }
        }
        if let Ok(raw) = std::env::var("SUBMISSION_FAKE_DELAY_INITIAL") {
            match humantime::parse_duration(&raw) {
                Ok(delay) => self.fake_delay.initial_delay = delay,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring SUBMISSION_FAKE_DELAY_INITIAL"),
            }
        }
        if let Some(samples) = env_parse("SUBMISSION_FAKE_DELAY_SAMPLES") {
            self.fake_delay.moving_average_samples = samples;
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
        }
    }
}

/// Management listener configuration
///
/// Metrics reveal how many requests were real, so they stay off the public
/// listener. Defaults to loopback only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagementConfig {
    /// Bind address (default: 127.0.0.1)
    pub host: IpAddr,
    /// Port (default: 8081)
    pub port: u16,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8081,
        }
    }
}

/// Key store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Keys the in-memory store holds before refusing further batches
    pub max_stored_keys: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_stored_keys: 1_000_000,
        }
    }
}

/// Payload limits and key validation bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    /// Max keys in one submission (default: 14, one per day of the window)
    pub max_number_of_keys: usize,
    /// Max request body size in bytes (default: 100KB)
    pub max_request_size: usize,
    /// Lowest accepted transmission risk level
    pub min_transmission_risk_level: i32,
    /// Highest accepted transmission risk level
    pub max_transmission_risk_level: i32,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            max_number_of_keys: 14,
            max_request_size: 100 * 1024,
            min_transmission_risk_level: 0,
            max_transmission_risk_level: 8,
        }
    }
}

/// How far back a key's rolling start interval may lie
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub retention_days: u32,
}

impl RetentionConfig {
    /// Retention horizon in 10-minute intervals.
    pub fn max_age_intervals(&self) -> i64 {
        i64::from(self.retention_days) * INTERVALS_PER_DAY
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { retention_days: 14 }
    }
}

/// TAN verification service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Base URL of the verification server
    pub base_url: String,
    /// Path of the verify endpoint
    pub path: String,
    /// Per-call timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl VerificationConfig {
    pub fn verify_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8004".to_string(),
            path: "/version/v1/tan/verify".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Fake request delay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FakeDelayConfig {
    /// Mean delay before any real request has been measured
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
    /// Number of real request durations in the moving average
    pub moving_average_samples: usize,
}

impl Default for FakeDelayConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            moving_average_samples: 5,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Risk range is inverted
    #[error("invalid transmission risk range: min {min} > max {max}")]
    InvalidRiskRange { min: i32, max: i32 },
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SubmissionConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retention_horizon_in_intervals() {
        let retention = RetentionConfig { retention_days: 14 };
        assert_eq!(retention.max_age_intervals(), 14 * 144);
    }

    #[test]
    fn test_inverted_risk_range() {
        let mut config = SubmissionConfig::default();
        config.payload.min_transmission_risk_level = 5;
        config.payload.max_transmission_risk_level = 2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRiskRange { min: 5, max: 2 })
        );
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = SubmissionConfig::default();
        config.payload.max_number_of_keys = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));

        let mut config = SubmissionConfig::default();
        config.retention.retention_days = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SubmissionConfig::default();
        config.verification.timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn test_management_listener_defaults_to_loopback() {
        let config = SubmissionConfig::default();
        assert!(config.management_addr().ip().is_loopback());
        assert_ne!(config.management_addr(), config.http_addr());
    }

    #[test]
    fn test_management_must_not_share_public_address() {
        let mut config = SubmissionConfig::default();
        config.management.host = config.http.host;
        config.management.port = config.http.port;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_store_capacity_must_be_positive() {
        let mut config = SubmissionConfig::default();
        assert_eq!(config.storage.max_stored_keys, 1_000_000);
        config.storage.max_stored_keys = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));
    }

    #[test]
    fn test_verify_url_joins_cleanly() {
        let config = VerificationConfig {
            base_url: "http://verification:8080/".to_string(),
            ..VerificationConfig::default()
        };
        assert_eq!(
            config.verify_url(),
            "http://verification:8080/version/v1/tan/verify"
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SubmissionConfig =
            serde_json::from_str(r#"{"retention":{"retention_days":7},"fake_delay":{"initial_delay":"250ms"}}"#)
                .unwrap();
        assert_eq!(config.retention.retention_days, 7);
        assert_eq!(config.fake_delay.initial_delay, Duration::from_millis(250));
        assert_eq!(config.payload.max_number_of_keys, 14);
        assert_eq!(config.http_addr().port(), 8080);
    }
}
