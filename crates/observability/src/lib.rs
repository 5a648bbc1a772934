//! Tracing/logging setup shared by the tillbook binaries and tests.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogOptions, init, init_for_tests};
