//! Telemetry Processors - configuration-driven record transform pipeline
//!
//! This crate compiles processor configuration (attribute, log, span and
//! metric-filter processors) into an immutable pipeline and applies it to
//! every outgoing span, log record and metric point. The implementation
//! prioritizes:
//!
//! 1. **Fail-fast configuration** - every pattern and field is validated once, at build time
//! 2. **Total record processing** - no per-record errors; a processor that cannot act does nothing
//! 3. **Predictable cost** - linear-time regex matching with compiled size limits
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `config` - Serde model of the processor configuration
//! - `record` - Span/log/metric record model
//! - `matching` - Include/exclude matchers and guarded regex compilation
//! - `actions` - Attribute actions (insert/update/delete/hash/extract/mask)
//! - `rewrite` - Span name / log body rewriting
//! - `processor` - One compiled processor per configured entry
//! - `pipeline` - Ordered processor chain, batches, atomic reload
//!
//! ## Example
//!
//! ```
//! use telemetry_processors::{Pipeline, Record};
//!
//! let pipeline = Pipeline::from_json_str(r#"{
//!     "processors": [{
//!         "id": "attributes/insert",
//!         "type": "attribute",
//!         "actions": [{"key": "attribute1", "value": "123", "action": "insert"}]
//!     }]
//! }"#).unwrap();
//!
//! let record = pipeline.process_owned(Record::span("svcA")).unwrap();
//! assert_eq!(record.attribute("attribute1"), Some("123"));
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod matching;
pub mod pipeline;
pub mod processor;
pub mod record;
pub mod rewrite;

#[cfg(feature = "python")]
mod python;

pub use config::{PipelineConfig, ProcessorConfig, ProcessorType};
pub use error::ConfigError;
pub use pipeline::{BatchResult, Disposition, Pipeline, PipelineHandle};
pub use record::{Record, RecordContext, RecordKind};

/// Initialize the module-level logger
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .try_init();
}
