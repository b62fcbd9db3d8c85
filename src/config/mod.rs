//! Processor configuration.
//!
//! Serde model of the `processors` section and the JSON entry points that
//! produce it. Discovery, environment overlay and merging happen upstream;
//! this module only accepts an already-assembled document.

pub mod loader;
pub mod model;

pub use loader::*;
pub use model::*;
