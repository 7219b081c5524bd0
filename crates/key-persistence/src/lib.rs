//! # Key Persistence
//!
//! The persisted form of an accepted diagnosis key and the port through which
//! the submission service stores it.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): the immutable `DiagnosisKey` record and errors
//! - **Ports Layer** (`ports/`): the `DiagnosisKeyRepository` trait
//! - **Adapters Layer** (`adapters/`): an in-memory store
//!
//! ## Storage Contract
//!
//! `save_diagnosis_keys` either stores every given record or reports a
//! failure. Records are never partially dropped. Keys already present are
//! skipped, so resubmissions of the same key are idempotent.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::memory::InMemoryDiagnosisKeyStore;
pub use domain::diagnosis_key::{DiagnosisKey, EXPECTED_ROLLING_PERIOD, KEY_DATA_LENGTH};
pub use domain::errors::PersistenceError;
pub use ports::DiagnosisKeyRepository;
