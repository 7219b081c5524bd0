//! # Ports Layer
//!
//! - **Inbound (Driving)**: the submission API the HTTP layer calls
//! - **Outbound (Driven)**: TAN verification and the clock
//!
//! The persistence port lives in the `key-persistence` crate.

pub mod inbound;
pub mod outbound;

pub use key_persistence::DiagnosisKeyRepository;
