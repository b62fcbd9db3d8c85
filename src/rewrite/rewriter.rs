//! Name/body rewriter.
//!
//! Two transforms, run in this order when both are configured:
//!
//! 1. `toAttributes`: the first rule whose pattern occurs in the current
//!    name/body wins. Its named groups are written to attributes and the
//!    matched group spans in the name/body become `{groupName}`.
//! 2. `fromAttributes`: the name/body is rebuilt by joining the listed
//!    attributes with `separator`. Missing attributes contribute "".

use crate::config::model::NameConfig;
use crate::error::ConfigError;
use crate::matching::pattern::{Anchoring, RegexSpec};
use crate::record::Record;

#[derive(Debug, Clone)]
struct Join {
    keys: Vec<String>,
    separator: String,
}

/// Compiled `name` (span) or `body` (log) section.
#[derive(Debug, Clone)]
pub struct Rewriter {
    rules: Vec<RegexSpec>,
    join: Option<Join>,
}

impl Rewriter {
    /// `field` is `name` or `body`, used in error messages.
    pub fn compile(processor: &str, field: &str, config: &NameConfig) -> Result<Self, ConfigError> {
        if config.from_attributes.is_none() && config.to_attributes.is_none() {
            return Err(ConfigError::missing(
                processor,
                &format!("{}.fromAttributes", field),
            ));
        }

        let join = match &config.from_attributes {
            Some(keys) if keys.is_empty() => {
                return Err(ConfigError::invalid_value(
                    processor,
                    &format!("{}.fromAttributes", field),
                    "at least one attribute key is required",
                ))
            }
            Some(keys) => Some(Join {
                keys: keys.clone(),
                separator: config.separator.clone().unwrap_or_default(),
            }),
            None => {
                if config.separator.is_some() {
                    return Err(ConfigError::illegal(
                        processor,
                        &format!("{}.separator", field),
                        "separator requires fromAttributes",
                    ));
                }
                None
            }
        };

        let rules = match &config.to_attributes {
            Some(to) if to.rules.is_empty() => {
                return Err(ConfigError::invalid_value(
                    processor,
                    &format!("{}.toAttributes.rules", field),
                    "at least one rule is required",
                ))
            }
            Some(to) => to
                .rules
                .iter()
                .enumerate()
                .map(|(i, rule)| {
                    let rule_field = format!("{}.toAttributes.rules[{}]", field, i);
                    RegexSpec::compile(processor, &rule_field, rule, Anchoring::Search, None)?
                        .require_groups(processor, &rule_field)
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self { rules, join })
    }

    pub fn apply(&self, record: &mut Record) {
        if !self.rules.is_empty() {
            self.apply_to_attributes(record);
        }
        if let Some(join) = &self.join {
            let joined = join
                .keys
                .iter()
                .map(|k| record.attribute(k).unwrap_or(""))
                .collect::<Vec<_>>()
                .join(&join.separator);
            record.set_subject(joined);
        }
    }

    fn apply_to_attributes(&self, record: &mut Record) {
        let subject = record.subject();
        let found = self.rules.iter().find_map(|rule| apply_rule(rule, subject));
        let Some((extracted, rewritten)) = found else {
            return;
        };

        for (name, value) in extracted {
            record.attributes.insert(name, value);
        }
        record.set_subject(rewritten);
    }
}

/// Groups captured by `rule` in `subject` and the templated subject, if
/// the rule occurs at all.
fn apply_rule(rule: &RegexSpec, subject: &str) -> Option<(Vec<(String, String)>, String)> {
    let caps = rule.regex.captures(subject)?;

    let mut extracted = Vec::with_capacity(rule.group_names.len());
    let mut rewritten = String::with_capacity(subject.len());
    let mut last = 0;

    for (index, name) in rule.regex.capture_names().enumerate() {
        let (name, m) = match (name, caps.get(index)) {
            (Some(name), Some(m)) => (name, m),
            _ => continue,
        };
        extracted.push((name.to_string(), m.as_str().to_string()));
        // nested groups fall inside an already replaced span
        if m.start() >= last {
            rewritten.push_str(&subject[last..m.start()]);
            rewritten.push('{');
            rewritten.push_str(name);
            rewritten.push('}');
            last = m.end();
        }
    }
    rewritten.push_str(&subject[last..]);

    Some((extracted, rewritten))
}
