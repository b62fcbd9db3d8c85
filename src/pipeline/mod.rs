//! Pipeline orchestration module.
//!
//! The compiled, ordered processor chain and everything around it:
//! - Build-time compilation (all-or-nothing)
//! - Per-record evaluation with drop short-circuit
//! - Batch processing
//! - Atomic replacement on configuration reload

pub mod batch;
pub mod chain;
pub mod context;
pub mod handle;

pub use batch::*;
pub use chain::*;
pub use context::*;
pub use handle::*;
