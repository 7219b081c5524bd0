//! Batch processing: validation pass, then acceptance window pass.
//!
//! The two passes are kept separate. Any invalid key voids the whole batch;
//! keys outside the acceptance window are dropped silently.

use crate::domain::config::PayloadConfig;
use crate::domain::keys::{from_submission, TemporaryExposureKey};
use crate::domain::retention::TemporalFilter;
use crate::domain::validation::{KeyValidationError, KeyValidator};
use key_persistence::DiagnosisKey;
use thiserror::Error;

/// Why a batch was rejected as a whole.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("submission contains {count} keys, at most {max} allowed")]
    TooManyKeys { count: usize, max: usize },

    #[error("key {index} is invalid: {source}")]
    InvalidKey {
        index: usize,
        #[source]
        source: KeyValidationError,
    },
}

/// Result of a batch that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedBatch {
    /// Records to hand to persistence, in submission order.
    pub accepted: Vec<DiagnosisKey>,
    /// Number of valid keys dropped for being outside the acceptance window.
    pub dropped: usize,
}

/// Runs validation and temporal filtering over a submitted batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchProcessor {
    validator: KeyValidator,
    filter: TemporalFilter,
    max_number_of_keys: usize,
}

impl BatchProcessor {
    pub fn new(validator: KeyValidator, filter: TemporalFilter, max_number_of_keys: usize) -> Self {
        Self {
            validator,
            filter,
            max_number_of_keys,
        }
    }

    /// Build from the payload and retention sections of the configuration.
    pub fn from_config(payload: &PayloadConfig, filter: TemporalFilter) -> Self {
        Self::new(
            KeyValidator::from_config(payload),
            filter,
            payload.max_number_of_keys,
        )
    }

    /// Validate every key, then keep the in-window ones.
    ///
    /// Returns `Err` without filtering anything if a single key is invalid.
    pub fn process(
        &self,
        keys: Vec<TemporaryExposureKey>,
        now_interval: i64,
    ) -> Result<ProcessedBatch, BatchError> {
        self.validate_all(&keys)?;
        Ok(self.retain_in_window(keys, now_interval))
    }

    /// First pass: all-or-nothing structural validation.
    pub fn validate_all(&self, keys: &[TemporaryExposureKey]) -> Result<(), BatchError> {
        if keys.len() > self.max_number_of_keys {
            return Err(BatchError::TooManyKeys {
                count: keys.len(),
                max: self.max_number_of_keys,
            });
        }

        for (index, key) in keys.iter().enumerate() {
            self.validator
                .validate(key)
                .map_err(|source| BatchError::InvalidKey { index, source })?;
        }
        Ok(())
    }

    /// Second pass: drop keys outside the acceptance window and map the rest.
    pub fn retain_in_window(
        &self,
        keys: Vec<TemporaryExposureKey>,
        now_interval: i64,
    ) -> ProcessedBatch {
        let submitted = keys.len();
        let accepted: Vec<DiagnosisKey> = keys
            .into_iter()
            .filter(|key| self.filter.is_in_window(key, now_interval))
            .map(from_submission)
            .collect();

        ProcessedBatch {
            dropped: submitted - accepted.len(),
            accepted,
        }
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::from_config(&PayloadConfig::default(), TemporalFilter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retention::INTERVALS_PER_DAY;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const NOW: i64 = 2_700_000;

    fn key(data: u8, days_ago: i64, risk: i32) -> TemporaryExposureKey {
        TemporaryExposureKey {
            key_data: vec![data; 16],
            transmission_risk_level: risk,
            rolling_start_interval_number: (NOW - days_ago * INTERVALS_PER_DAY) as i32,
            rolling_period: 144,
        }
    }

    #[test]
    fn test_all_valid_in_window_keys_are_accepted() {
        let keys = vec![key(1, 2, 3), key(2, 4, 6), key(3, 10, 8)];
        let expected: HashSet<_> = keys.iter().cloned().map(from_submission).collect();

        let batch = BatchProcessor::default().process(keys, NOW).unwrap();

        assert_eq!(batch.accepted.len(), 3);
        assert_eq!(batch.accepted.into_iter().collect::<HashSet<_>>(), expected);
        assert_eq!(batch.dropped, 0);
    }

    #[test]
    fn test_outdated_key_is_dropped_not_rejected() {
        let keys = vec![key(1, 2, 3), key(2, 4, 6), key(3, 10, 8), key(2, 99, 5)];

        let batch = BatchProcessor::default().process(keys.clone(), NOW).unwrap();

        assert_eq!(
            batch.accepted,
            keys[..3].iter().cloned().map(from_submission).collect::<Vec<_>>()
        );
        assert_eq!(batch.dropped, 1);
    }

    #[test]
    fn test_only_outdated_keys_yield_empty_batch() {
        let batch = BatchProcessor::default()
            .process(vec![key(2, 99, 5)], NOW)
            .unwrap();
        assert!(batch.accepted.is_empty());
        assert_eq!(batch.dropped, 1);
    }

    #[test]
    fn test_single_invalid_key_voids_batch() {
        let keys = vec![key(1, 2, 3), key(2, 2, 999), key(3, 2, 1)];

        let result = BatchProcessor::default().process(keys, NOW);

        assert_eq!(
            result,
            Err(BatchError::InvalidKey {
                index: 1,
                source: KeyValidationError::TransmissionRiskOutOfRange {
                    value: 999,
                    min: 0,
                    max: 8
                }
            })
        );
    }

    #[test]
    fn test_invalid_outdated_key_still_voids_batch() {
        // validation runs before filtering, so an old invalid key is not just dropped
        let result = BatchProcessor::default().process(vec![key(1, 99, 999)], NOW);
        assert!(matches!(result, Err(BatchError::InvalidKey { index: 0, .. })));
    }

    #[test]
    fn test_too_many_keys() {
        let keys: Vec<_> = (0..15).map(|i| key(i as u8, 1, 1)).collect();
        assert_eq!(
            BatchProcessor::default().validate_all(&keys),
            Err(BatchError::TooManyKeys { count: 15, max: 14 })
        );
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let batch = BatchProcessor::default().process(Vec::new(), NOW).unwrap();
        assert!(batch.accepted.is_empty());
        assert_eq!(batch.dropped, 0);
    }

    proptest! {
        #[test]
        fn prop_accepted_is_image_of_valid_in_window_keys(
            shapes in prop::collection::vec((-300i64..3_000, -2i32..11, any::<bool>()), 0..=14)
        ) {
            let keys: Vec<TemporaryExposureKey> = shapes
                .iter()
                .enumerate()
                .map(|(i, &(age, risk, full_length))| TemporaryExposureKey {
                    key_data: vec![i as u8; if full_length { 16 } else { 15 }],
                    transmission_risk_level: risk,
                    rolling_start_interval_number: (NOW - age) as i32,
                    rolling_period: 144,
                })
                .collect();
            let all_valid = shapes
                .iter()
                .all(|&(_, risk, full_length)| full_length && (0..=8).contains(&risk));

            let result = BatchProcessor::default().process(keys.clone(), NOW);

            if all_valid {
                let batch = result.unwrap();
                let horizon = 14 * INTERVALS_PER_DAY;
                let expected: Vec<DiagnosisKey> = keys
                    .iter()
                    .zip(&shapes)
                    .filter(|(_, shape)| (0..=horizon).contains(&shape.0))
                    .map(|(key, _)| from_submission(key.clone()))
                    .collect();
                let distinct: HashSet<_> = batch.accepted.iter().cloned().collect();

                prop_assert_eq!(distinct.len(), batch.accepted.len());
                prop_assert_eq!(batch.dropped, keys.len() - expected.len());
                prop_assert_eq!(batch.accepted, expected);
            } else {
                let is_invalid_key = matches!(result, Err(BatchError::InvalidKey { .. }));
                prop_assert!(is_invalid_key);
            }
        }
    }
}
