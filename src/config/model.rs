//! Processor configuration schema.
//!
//! Field names follow the JSON configuration (`matchType`, `spanNames`,
//! `fromAttribute`, ...). Optional sections are kept as `Option` so that
//! validation can tell "absent" from "present but empty" and reject
//! sections that are illegal for a processor type.

use serde::{Deserialize, Serialize};

/// Top-level document: `{ "processors": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessorType {
    Attribute,
    Log,
    Span,
    MetricFilter,
}

impl ProcessorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorType::Attribute => "attribute",
            ProcessorType::Log => "log",
            ProcessorType::Span => "span",
            ProcessorType::MetricFilter => "metric-filter",
        }
    }
}

/// One entry of the `processors` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProcessorConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub processor_type: ProcessorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<MatchConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<MatchConfig>,
    /// Attribute processors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionConfig>>,
    /// Log processors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<NameConfig>,
    /// Span processors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<NameConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Strict,
    Regexp,
}

/// Selection rule used by `include` and `exclude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchConfig {
    pub match_type: MatchType,
    #[serde(default)]
    pub span_names: Vec<String>,
    #[serde(default)]
    pub log_bodies: Vec<String>,
    #[serde(default)]
    pub metric_names: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeCriterion>,
}

/// `value` omitted means "key present with any value".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeCriterion {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Insert,
    Update,
    Delete,
    Hash,
    Extract,
    Mask,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Insert => "insert",
            ActionType::Update => "update",
            ActionType::Delete => "delete",
            ActionType::Hash => "hash",
            ActionType::Extract => "extract",
            ActionType::Mask => "mask",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActionConfig {
    pub action: ActionType,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_attribute: Option<String>,
    /// Extract and mask only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Derived from `pattern` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_names: Option<Vec<String>>,
    /// Mask only. `${group}` placeholders refer to named groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
}

/// Span name (`name`) or log body (`body`) rewrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NameConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_attributes: Option<ToAttributesConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToAttributesConfig {
    /// Order is significant: the first matching rule wins.
    #[serde(default)]
    pub rules: Vec<String>,
}
