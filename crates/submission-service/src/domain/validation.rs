//! Structural validation of individual submitted keys.
//!
//! A batch is only accepted if every key passes; see `domain::batch`.

use crate::domain::config::PayloadConfig;
use crate::domain::keys::TemporaryExposureKey;
use key_persistence::{EXPECTED_ROLLING_PERIOD, KEY_DATA_LENGTH};
use thiserror::Error;

/// Why a single key was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyValidationError {
    #[error("key data must be {expected} bytes, got {actual}")]
    InvalidKeyDataLength { expected: usize, actual: usize },

    #[error("rolling period must be {expected}, got {actual}")]
    InvalidRollingPeriod { expected: i32, actual: i32 },

    #[error("transmission risk level {value} outside [{min}, {max}]")]
    TransmissionRiskOutOfRange { value: i32, min: i32, max: i32 },
}

/// Checks key data length, rolling period and transmission risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValidator {
    min_transmission_risk_level: i32,
    max_transmission_risk_level: i32,
}

impl KeyValidator {
    pub fn new(min_transmission_risk_level: i32, max_transmission_risk_level: i32) -> Self {
        Self {
            min_transmission_risk_level,
            max_transmission_risk_level,
        }
    }

    pub fn from_config(config: &PayloadConfig) -> Self {
        Self::new(
            config.min_transmission_risk_level,
            config.max_transmission_risk_level,
        )
    }

    pub fn validate(&self, key: &TemporaryExposureKey) -> Result<(), KeyValidationError> {
        if key.key_data.len() != KEY_DATA_LENGTH {
            return Err(KeyValidationError::InvalidKeyDataLength {
                expected: KEY_DATA_LENGTH,
                actual: key.key_data.len(),
            });
        }

        if key.rolling_period != EXPECTED_ROLLING_PERIOD {
            return Err(KeyValidationError::InvalidRollingPeriod {
                expected: EXPECTED_ROLLING_PERIOD,
                actual: key.rolling_period,
            });
        }

        let risk = key.transmission_risk_level;
        if risk < self.min_transmission_risk_level || risk > self.max_transmission_risk_level {
            return Err(KeyValidationError::TransmissionRiskOutOfRange {
                value: risk,
                min: self.min_transmission_risk_level,
                max: self.max_transmission_risk_level,
            });
        }

        Ok(())
    }
}

impl Default for KeyValidator {
    fn default() -> Self {
        Self::from_config(&PayloadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_key() -> TemporaryExposureKey {
        TemporaryExposureKey {
            key_data: vec![1; KEY_DATA_LENGTH],
            transmission_risk_level: 3,
            rolling_start_interval_number: 2_650_000,
            rolling_period: EXPECTED_ROLLING_PERIOD,
        }
    }

    #[test]
    fn test_valid_key_passes() {
        assert_eq!(KeyValidator::default().validate(&valid_key()), Ok(()));
    }

    #[test]
    fn test_short_and_long_key_data_rejected() {
        let validator = KeyValidator::default();
        for len in [0, 15, 17, 32] {
            let key = TemporaryExposureKey {
                key_data: vec![1; len],
                ..valid_key()
            };
            assert_eq!(
                validator.validate(&key),
                Err(KeyValidationError::InvalidKeyDataLength {
                    expected: 16,
                    actual: len
                })
            );
        }
    }

    #[test]
    fn test_rolling_period_must_match_exactly() {
        let validator = KeyValidator::default();
        for period in [0, 143, 145, -144] {
            let key = TemporaryExposureKey {
                rolling_period: period,
                ..valid_key()
            };
            assert!(matches!(
                validator.validate(&key),
                Err(KeyValidationError::InvalidRollingPeriod { .. })
            ));
        }
    }

    #[test]
    fn test_risk_level_999_rejected() {
        let key = TemporaryExposureKey {
            transmission_risk_level: 999,
            ..valid_key()
        };
        assert_eq!(
            KeyValidator::default().validate(&key),
            Err(KeyValidationError::TransmissionRiskOutOfRange {
                value: 999,
                min: 0,
                max: 8
            })
        );
    }

    #[test]
    fn test_risk_range_bounds_are_inclusive() {
        let validator = KeyValidator::new(1, 8);
        let at = |risk| TemporaryExposureKey {
            transmission_risk_level: risk,
            ..valid_key()
        };
        assert!(validator.validate(&at(1)).is_ok());
        assert!(validator.validate(&at(8)).is_ok());
        assert!(validator.validate(&at(0)).is_err());
        assert!(validator.validate(&at(9)).is_err());
    }

    proptest! {
        #[test]
        fn prop_risk_accepted_iff_in_range(risk in -20i32..1_000) {
            let key = TemporaryExposureKey { transmission_risk_level: risk, ..valid_key() };
            let result = KeyValidator::default().validate(&key);
            prop_assert_eq!(result.is_ok(), (0..=8).contains(&risk));
        }
    }
}
