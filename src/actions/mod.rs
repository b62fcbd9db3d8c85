//! Attribute actions.
//!
//! Compiled insert/update/delete/hash/extract/mask steps and the executor
//! that applies them, in order, to a record's attributes.

pub mod executor;
pub mod template;

pub use executor::*;
pub use template::*;
