//! Compiled processors.
//!
//! One `Processor` per configured entry: selection plus either ordered
//! attribute actions, a name/body rewrite, or a metric drop rule.

pub mod compiled;

pub use compiled::*;
