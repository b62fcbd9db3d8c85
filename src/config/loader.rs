//! JSON loading for processor configuration.
//!
//! The document is parsed in two steps so that a malformed processor entry
//! is reported against its `id` instead of a bare line/column.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;

use super::model::{PipelineConfig, ProcessorConfig};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    processors: Vec<Value>,
}

impl PipelineConfig {
    /// Parse a `{ "processors": [...] }` JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, ConfigError> {
        let raw: RawDocument = serde_json::from_value(value)?;

        let processors = raw
            .processors
            .into_iter()
            .enumerate()
            .map(|(index, entry)| parse_processor(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { processors })
    }
}

fn parse_processor(index: usize, entry: Value) -> Result<ProcessorConfig, ConfigError> {
    let label = entry
        .get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("#{}", index));

    serde_json::from_value(entry).map_err(|e| ConfigError::Malformed {
        processor: label,
        reason: e.to_string(),
    })
}
