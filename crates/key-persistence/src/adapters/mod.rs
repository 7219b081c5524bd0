//! # Adapters Layer
//!
//! Infrastructure implementations of the persistence port.

pub mod memory;
