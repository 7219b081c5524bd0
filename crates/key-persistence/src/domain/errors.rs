//! # Persistence Errors

use thiserror::Error;

/// Errors reported by a `DiagnosisKeyRepository`.
///
/// Every variant means that none of the records in the failed call were stored.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// The store has no room left for the batch.
    #[error("Storage full: {stored} keys stored, capacity {capacity}, batch of {requested}")]
    StorageFull {
        stored: usize,
        capacity: usize,
        requested: usize,
    },

    /// The backing store is unreachable.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The write itself failed.
    #[error("Write failed: {0}")]
    WriteFailed(String),
}
