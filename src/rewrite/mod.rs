//! Span name and log body rewriting.

pub mod rewriter;

pub use rewriter::*;
