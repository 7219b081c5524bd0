//! Adapters for the submission service.
//!
//! Infrastructure implementations of the outbound ports plus the fake
//! request delay state.

pub mod fake_delay;
pub mod tan;

pub use fake_delay::FakeDelayManager;
pub use tan::HttpTanVerifier;
