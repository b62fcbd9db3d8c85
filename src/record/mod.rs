//! Telemetry record model.
//!
//! The subset of span/log/metric shape the processors read and write, plus
//! the identifiers and timestamp they carry through untouched.

pub mod telemetry;

pub use telemetry::*;
