//! Attribute action compilation and execution.
//!
//! Actions run strictly in configured order and each sees the effects of
//! the previous ones. An action whose target attribute is absent (other
//! than insert) does nothing.
//!
//! Extract patterns must match the whole value. Mask patterns replace
//! every occurrence in the value.

use regex::Captures;
use sha2::{Digest, Sha256};

use crate::config::model::{ActionConfig, ActionType};
use crate::error::ConfigError;
use crate::matching::pattern::{Anchoring, RegexSpec};
use crate::record::Record;

use super::template::ReplaceTemplate;

/// Where insert/update take the new value from.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    Literal(String),
    /// Current value of another attribute; the action is skipped if absent.
    Attribute(String),
}

impl ValueSource {
    fn resolve(&self, record: &Record) -> Option<String> {
        match self {
            ValueSource::Literal(v) => Some(v.clone()),
            ValueSource::Attribute(key) => record.attributes.get(key).cloned(),
        }
    }
}

/// A compiled attribute action.
#[derive(Debug, Clone)]
pub enum Action {
    Insert { key: String, source: ValueSource },
    Update { key: String, source: ValueSource },
    Delete { key: String },
    Hash { key: String },
    Extract { key: String, pattern: RegexSpec },
    Mask {
        key: String,
        pattern: RegexSpec,
        replace: ReplaceTemplate,
    },
}

impl Action {
    pub fn key(&self) -> &str {
        match self {
            Action::Insert { key, .. }
            | Action::Update { key, .. }
            | Action::Delete { key }
            | Action::Hash { key }
            | Action::Extract { key, .. }
            | Action::Mask { key, .. } => key,
        }
    }

    /// Validate and compile one `actions[index]` entry.
    pub fn compile(
        processor: &str,
        index: usize,
        config: &ActionConfig,
    ) -> Result<Self, ConfigError> {
        let field = |name: &str| format!("actions[{}].{}", index, name);
        let kind = config.action.as_str();

        let forbid = |present: bool, name: &str| -> Result<(), ConfigError> {
            if present {
                Err(ConfigError::illegal(
                    processor,
                    &field(name),
                    format!("not used by '{}' actions", kind),
                ))
            } else {
                Ok(())
            }
        };

        if config.key.is_empty() {
            return Err(ConfigError::invalid_value(processor, &field("key"), "key is empty"));
        }
        let key = config.key.clone();

        match config.action {
            ActionType::Insert | ActionType::Update => {
                forbid(config.pattern.is_some(), "pattern")?;
                forbid(config.group_names.is_some(), "groupNames")?;
                forbid(config.replace.is_some(), "replace")?;

                let source = match (&config.value, &config.from_attribute) {
                    (Some(v), None) => ValueSource::Literal(v.clone()),
                    (None, Some(from)) => ValueSource::Attribute(from.clone()),
                    (Some(_), Some(_)) => {
                        return Err(ConfigError::illegal(
                            processor,
                            &field("fromAttribute"),
                            "'value' and 'fromAttribute' are mutually exclusive",
                        ))
                    }
                    (None, None) => return Err(ConfigError::missing(processor, &field("value"))),
                };

                Ok(if config.action == ActionType::Insert {
                    Action::Insert { key, source }
                } else {
                    Action::Update { key, source }
                })
            }
            ActionType::Delete | ActionType::Hash => {
                forbid(config.value.is_some(), "value")?;
                forbid(config.from_attribute.is_some(), "fromAttribute")?;
                forbid(config.pattern.is_some(), "pattern")?;
                forbid(config.group_names.is_some(), "groupNames")?;
                forbid(config.replace.is_some(), "replace")?;

                Ok(if config.action == ActionType::Delete {
                    Action::Delete { key }
                } else {
                    Action::Hash { key }
                })
            }
            ActionType::Extract => {
                forbid(config.value.is_some(), "value")?;
                forbid(config.from_attribute.is_some(), "fromAttribute")?;
                forbid(config.replace.is_some(), "replace")?;

                let pattern = compile_action_pattern(processor, index, config, Anchoring::Full)?
                    .require_groups(processor, &field("pattern"))?;
                Ok(Action::Extract { key, pattern })
            }
            ActionType::Mask => {
                forbid(config.value.is_some(), "value")?;
                forbid(config.from_attribute.is_some(), "fromAttribute")?;

                let pattern = compile_action_pattern(processor, index, config, Anchoring::Search)?;
                let replace = config
                    .replace
                    .as_deref()
                    .map(ReplaceTemplate::parse)
                    .ok_or_else(|| ConfigError::missing(processor, &field("replace")))?;

                let unknown: Vec<String> = replace
                    .placeholders()
                    .filter(|name| !pattern.group_names.iter().any(|g| g.as_str() == *name))
                    .map(|name| name.to_string())
                    .collect();
                if !unknown.is_empty() {
                    return Err(ConfigError::GroupNameMismatch {
                        processor: processor.to_string(),
                        field: field("replace"),
                        expected: unknown,
                        found: pattern.group_names.clone(),
                    });
                }

                Ok(Action::Mask {
                    key,
                    pattern,
                    replace,
                })
            }
        }
    }

    /// Apply this action to `record` in place.
    pub fn apply(&self, record: &mut Record) {
        match self {
            Action::Insert { key, source } => {
                if record.attributes.contains_key(key) {
                    return;
                }
                if let Some(value) = source.resolve(record) {
                    record.attributes.insert(key.clone(), value);
                }
            }
            Action::Update { key, source } => {
                if !record.attributes.contains_key(key) {
                    return;
                }
                if let Some(value) = source.resolve(record) {
                    record.attributes.insert(key.clone(), value);
                }
            }
            Action::Delete { key } => {
                record.attributes.remove(key);
            }
            Action::Hash { key } => {
                if let Some(value) = record.attributes.get_mut(key) {
                    *value = hash_value(value);
                }
            }
            Action::Extract { key, pattern } => {
                let extracted = match record.attributes.get(key) {
                    Some(value) => extract_groups(pattern, value),
                    None => return,
                };
                for (name, value) in extracted {
                    record.attributes.insert(name, value);
                }
            }
            Action::Mask {
                key,
                pattern,
                replace,
            } => {
                if let Some(value) = record.attributes.get_mut(key) {
                    if pattern.regex.is_match(value) {
                        let masked = pattern
                            .regex
                            .replace_all(value, |caps: &Captures<'_>| replace.expand(caps))
                            .into_owned();
                        *value = masked;
                    }
                }
            }
        }
    }
}

fn compile_action_pattern(
    processor: &str,
    index: usize,
    config: &ActionConfig,
    anchoring: Anchoring,
) -> Result<RegexSpec, ConfigError> {
    let field = format!("actions[{}].pattern", index);
    let source = config
        .pattern
        .as_deref()
        .ok_or_else(|| ConfigError::missing(processor, &field))?;

    match RegexSpec::compile(processor, &field, source, anchoring, config.group_names.as_deref()) {
        Err(ConfigError::GroupNameMismatch {
            expected, found, ..
        }) => Err(ConfigError::GroupNameMismatch {
            processor: processor.to_string(),
            field: format!("actions[{}].groupNames", index),
            expected,
            found,
        }),
        other => other,
    }
}

/// Named groups that participated in a full match of `value`.
fn extract_groups(pattern: &RegexSpec, value: &str) -> Vec<(String, String)> {
    match pattern.regex.captures(value) {
        Some(caps) => pattern
            .group_names
            .iter()
            .filter_map(|name| caps.name(name).map(|m| (name.clone(), m.as_str().to_string())))
            .collect(),
        None => Vec::new(),
    }
}

/// Lowercase hex SHA-256 of `value`.
pub fn hash_value(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Apply `actions` to `record` in order.
pub fn apply(actions: &[Action], record: &mut Record) {
    for action in actions {
        action.apply(record);
    }
}
