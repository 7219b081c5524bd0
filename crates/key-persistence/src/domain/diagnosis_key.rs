//! # Diagnosis Key Record
//!
//! The form in which an accepted submission key is stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the raw key material in bytes.
pub const KEY_DATA_LENGTH: usize = 16;

/// Number of 10-minute intervals a key is valid for (one day).
pub const EXPECTED_ROLLING_PERIOD: i32 = 144;

/// A diagnosis key as persisted.
///
/// Immutable once constructed. Equality and hashing cover all four fields,
/// so two records built from the same submission compare equal.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagnosisKey {
    key_data: Vec<u8>,
    rolling_start_interval_number: i32,
    rolling_period: i32,
    transmission_risk_level: i32,
}

impl DiagnosisKey {
    pub fn new(
        key_data: Vec<u8>,
        rolling_start_interval_number: i32,
        rolling_period: i32,
        transmission_risk_level: i32,
    ) -> Self {
        Self {
            key_data,
            rolling_start_interval_number,
            rolling_period,
            transmission_risk_level,
        }
    }

    pub fn key_data(&self) -> &[u8] {
        &self.key_data
    }

    /// Start of the key's validity, in 10-minute intervals since the Unix epoch.
    pub fn rolling_start_interval_number(&self) -> i32 {
        self.rolling_start_interval_number
    }

    pub fn rolling_period(&self) -> i32 {
        self.rolling_period
    }

    pub fn transmission_risk_level(&self) -> i32 {
        self.transmission_risk_level
    }
}

impl fmt::Debug for DiagnosisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosisKey")
            .field("key_data", &hex::encode(&self.key_data))
            .field(
                "rolling_start_interval_number",
                &self.rolling_start_interval_number,
            )
            .field("rolling_period", &self.rolling_period)
            .field("transmission_risk_level", &self.transmission_risk_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key(data: u8, start: i32, risk: i32) -> DiagnosisKey {
        DiagnosisKey::new(
            vec![data; KEY_DATA_LENGTH],
            start,
            EXPECTED_ROLLING_PERIOD,
            risk,
        )
    }

    #[test]
    fn test_equality_is_by_content() {
        assert_eq!(key(1, 100, 3), key(1, 100, 3));
        assert_ne!(key(1, 100, 3), key(2, 100, 3));
        assert_ne!(key(1, 100, 3), key(1, 101, 3));
        assert_ne!(key(1, 100, 3), key(1, 100, 4));
    }

    #[test]
    fn test_hash_set_collapses_identical_records() {
        let set: HashSet<_> = [key(1, 100, 3), key(1, 100, 3), key(2, 100, 3)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_debug_renders_key_data_as_hex() {
        let rendered = format!("{:?}", key(0xab, 7, 1));
        assert!(rendered.contains("abababab"));
        assert!(rendered.contains("rolling_start_interval_number: 7"));
    }
}
