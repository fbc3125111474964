//! Tracing/logging setup shared by the stockroom binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{init, LogFormat};
