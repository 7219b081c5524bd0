//! # Domain Layer
//!
//! Pure data types with no I/O dependencies.

pub mod diagnosis_key;
pub mod errors;
