//! HTTP middleware for the submission endpoint.
//!
//! Layer order: Request → Tracing → Handler. Request outcomes are counted by
//! `SubmissionMetrics`, which the service updates directly.

pub mod metrics;
pub mod tracing;

pub use metrics::{RequestTimer, SubmissionMetrics};
pub use tracing::TracingLayer;
