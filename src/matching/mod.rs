//! Record selection.
//!
//! Include/exclude rules are compiled once into immutable matchers; all
//! regular expressions go through the guarded builder in `pattern`.

pub mod matcher;
pub mod pattern;

pub use matcher::*;
pub use pattern::*;
