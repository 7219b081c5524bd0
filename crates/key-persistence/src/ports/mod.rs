//! # Ports Layer
//!
//! Driven port used by the submission service to store accepted keys.

use crate::domain::diagnosis_key::DiagnosisKey;
use crate::domain::errors::PersistenceError;
use async_trait::async_trait;

/// Storage for accepted diagnosis keys.
///
/// Implementations must be thread-safe (`Send + Sync`); concurrent requests
/// may submit overlapping keys and deduplication is the implementation's job.
#[async_trait]
pub trait DiagnosisKeyRepository: Send + Sync {
    /// Store all given keys.
    ///
    /// # Errors
    /// Returns `PersistenceError` if the batch could not be stored. In that
    /// case no key of the batch is stored.
    async fn save_diagnosis_keys(&self, keys: Vec<DiagnosisKey>) -> Result<(), PersistenceError>;
}
