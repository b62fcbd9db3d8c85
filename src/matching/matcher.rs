//! Include/exclude evaluation.
//!
//! A compiled `Matcher` is the AND of its populated dimensions; each
//! dimension is an OR over its listed values. Empty dimensions are
//! vacuously true, so a matcher with nothing populated selects every
//! record.

use std::collections::{HashMap, HashSet};

use regex::{Regex, RegexSet};

use crate::config::model::{AttributeCriterion, MatchConfig, MatchType};
use crate::error::ConfigError;
use crate::record::{Record, RecordKind};

use super::pattern::{compile_pattern, compile_pattern_set, Anchoring};

/// Membership test over a list of names.
#[derive(Debug, Clone)]
enum NameMatcher {
    Strict(HashSet<String>),
    Regexp(RegexSet),
}

impl NameMatcher {
    fn compile(
        processor: &str,
        field: &str,
        match_type: MatchType,
        names: &[String],
    ) -> Result<Option<Self>, ConfigError> {
        if names.is_empty() {
            return Ok(None);
        }
        let matcher = match match_type {
            MatchType::Strict => NameMatcher::Strict(names.iter().cloned().collect()),
            MatchType::Regexp => {
                NameMatcher::Regexp(compile_pattern_set(processor, field, names, Anchoring::Full)?)
            }
        };
        Ok(Some(matcher))
    }

    fn is_match(&self, subject: &str) -> bool {
        match self {
            NameMatcher::Strict(names) => names.contains(subject),
            NameMatcher::Regexp(set) => set.is_match(subject),
        }
    }
}

#[derive(Debug, Clone)]
enum ValueMatcher {
    Present,
    Exact(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct AttributeMatcher {
    key: String,
    value: ValueMatcher,
}

impl AttributeMatcher {
    fn compile(
        processor: &str,
        field: &str,
        match_type: MatchType,
        criterion: &AttributeCriterion,
    ) -> Result<Self, ConfigError> {
        if criterion.key.is_empty() {
            return Err(ConfigError::invalid_value(processor, field, "attribute key is empty"));
        }
        let value = match (&criterion.value, match_type) {
            (None, _) => ValueMatcher::Present,
            (Some(v), MatchType::Strict) => ValueMatcher::Exact(v.clone()),
            (Some(v), MatchType::Regexp) => ValueMatcher::Pattern(compile_pattern(
                processor,
                &format!("{}.value", field),
                v,
                Anchoring::Full,
            )?),
        };
        Ok(Self {
            key: criterion.key.clone(),
            value,
        })
    }

    fn is_match(&self, attributes: &HashMap<String, String>) -> bool {
        match (attributes.get(&self.key), &self.value) {
            (None, _) => false,
            (Some(_), ValueMatcher::Present) => true,
            (Some(actual), ValueMatcher::Exact(expected)) => actual == expected,
            (Some(actual), ValueMatcher::Pattern(re)) => re.is_match(actual),
        }
    }
}

/// Compiled form of a `MatchConfig`.
///
/// A populated name list only ever matches records of its own kind:
/// a matcher with `spanNames` never selects a log or a metric.
#[derive(Debug, Clone)]
pub struct Matcher {
    span_names: Option<NameMatcher>,
    log_bodies: Option<NameMatcher>,
    metric_names: Option<NameMatcher>,
    attributes: Vec<AttributeMatcher>,
}

impl Matcher {
    /// Compile `config`. `field` is `include` or `exclude`, used in errors.
    pub fn compile(
        processor: &str,
        field: &str,
        config: &MatchConfig,
    ) -> Result<Self, ConfigError> {
        let span_names = NameMatcher::compile(
            processor,
            &format!("{}.spanNames", field),
            config.match_type,
            &config.span_names,
        )?;
        let log_bodies = NameMatcher::compile(
            processor,
            &format!("{}.logBodies", field),
            config.match_type,
            &config.log_bodies,
        )?;
        let metric_names = NameMatcher::compile(
            processor,
            &format!("{}.metricNames", field),
            config.match_type,
            &config.metric_names,
        )?;
        let attributes = config
            .attributes
            .iter()
            .enumerate()
            .map(|(i, criterion)| {
                AttributeMatcher::compile(
                    processor,
                    &format!("{}.attributes[{}]", field, i),
                    config.match_type,
                    criterion,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            span_names,
            log_bodies,
            metric_names,
            attributes,
        })
    }

    /// Whether `record` satisfies every populated dimension.
    pub fn is_match(&self, record: &Record) -> bool {
        let dimensions = [
            (RecordKind::Span, &self.span_names),
            (RecordKind::Log, &self.log_bodies),
            (RecordKind::Metric, &self.metric_names),
        ];
        for (kind, names) in dimensions {
            let Some(names) = names else { continue };
            if kind != record.kind || !names.is_match(record.subject()) {
                return false;
            }
        }
        self.attributes.iter().all(|a| a.is_match(&record.attributes))
    }
}

/// Selection rule: included (or no include) and not excluded.
pub fn matches(include: Option<&Matcher>, exclude: Option<&Matcher>, record: &Record) -> bool {
    if let Some(include) = include {
        if !include.is_match(record) {
            return false;
        }
    }
    match exclude {
        Some(exclude) => !exclude.is_match(record),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_config(value: serde_json::Value) -> MatchConfig {
        serde_json::from_value(value).unwrap()
    }

    fn compile(value: serde_json::Value) -> Matcher {
        Matcher::compile("test", "include", &match_config(value)).unwrap()
    }

    #[test]
    fn test_empty_matcher_selects_everything() {
        let m = compile(serde_json::json!({"matchType": "strict"}));
        assert!(m.is_match(&Record::span("anything")));
        assert!(m.is_match(&Record::log("body")));
        assert!(m.is_match(&Record::metric("cpu")));
    }

    #[test]
    fn test_strict_span_names_case_sensitive() {
        let m = compile(serde_json::json!({"matchType": "strict", "spanNames": ["svcA", "svcB"]}));
        assert!(m.is_match(&Record::span("svcA")));
        assert!(m.is_match(&Record::span("svcB")));
        assert!(!m.is_match(&Record::span("svca")));
        assert!(!m.is_match(&Record::span("svcC")));
    }

    #[test]
    fn test_regexp_log_bodies_full_match() {
        let m = compile(serde_json::json!({"matchType": "regexp", "logBodies": [".*password.*"]}));
        assert!(m.is_match(&Record::log("user password reset")));
        assert!(!m.is_match(&Record::log("user login")));

        let m = compile(serde_json::json!({"matchType": "regexp", "logBodies": ["login"]}));
        assert!(!m.is_match(&Record::log("user login")));
    }

    #[test]
    fn test_name_dimension_of_other_kind_never_matches() {
        let m = compile(serde_json::json!({"matchType": "strict", "spanNames": ["svcA"]}));
        assert!(m.is_match(&Record::span("svcA")));
        assert!(!m.is_match(&Record::span("svcB")));
        assert!(!m.is_match(&Record::log("svcA")));
        assert!(!m.is_match(&Record::log("unrelated log line")));
        assert!(!m.is_match(&Record::metric("svcA")));

        let m = compile(serde_json::json!({"matchType": "regexp", "logBodies": [".*"]}));
        assert!(m.is_match(&Record::log("anything")));
        assert!(!m.is_match(&Record::span("anything")));
    }

    #[test]
    fn test_exclude_span_names_never_excludes_logs() {
        let exclude = Matcher::compile(
            "test",
            "exclude",
            &match_config(serde_json::json!({"matchType": "strict", "spanNames": ["svcA"]})),
        )
        .unwrap();

        // a log can never satisfy spanNames, so it is not excluded
        assert!(matches(None, Some(&exclude), &Record::log("svcA")));
        assert!(!matches(None, Some(&exclude), &Record::span("svcA")));
        assert!(matches(None, Some(&exclude), &Record::span("svcB")));
    }

    #[test]
    fn test_attribute_key_presence() {
        let m = compile(serde_json::json!({"matchType": "strict", "attributes": [{"key": "db.statement"}]}));
        assert!(m.is_match(&Record::span("q").with_attribute("db.statement", "SELECT 1")));
        assert!(!m.is_match(&Record::span("q")));
    }

    #[test]
    fn test_attributes_are_anded() {
        let m = compile(serde_json::json!({
            "matchType": "strict",
            "attributes": [{"key": "env", "value": "prod"}, {"key": "tier", "value": "web"}]
        }));
        let both = Record::span("s").with_attribute("env", "prod").with_attribute("tier", "web");
        let one = Record::span("s").with_attribute("env", "prod").with_attribute("tier", "db");
        assert!(m.is_match(&both));
        assert!(!m.is_match(&one));
    }

    #[test]
    fn test_regexp_attribute_value() {
        let m = compile(serde_json::json!({
            "matchType": "regexp",
            "attributes": [{"key": "http.url", "value": "https://.*/cardid/.*"}]
        }));
        assert!(m.is_match(&Record::span("s").with_attribute("http.url", "https://h/cardid/1234")));
        assert!(!m.is_match(&Record::span("s").with_attribute("http.url", "https://h/users")));
    }

    #[test]
    fn test_exclude_takes_precedence() {
        let include = compile(serde_json::json!({"matchType": "strict"}));
        let exclude = Matcher::compile(
            "test",
            "exclude",
            &match_config(serde_json::json!({
                "matchType": "strict",
                "attributes": [{"key": "redact_trace", "value": "false"}]
            })),
        )
        .unwrap();

        let excluded = Record::span("svcA").with_attribute("redact_trace", "false");
        let kept = Record::span("svcA").with_attribute("redact_trace", "true");

        assert!(!matches(Some(&include), Some(&exclude), &excluded));
        assert!(matches(Some(&include), Some(&exclude), &kept));
        assert!(matches(None, None, &excluded));
    }

    #[test]
    fn test_invalid_regexp_is_config_error() {
        let err = Matcher::compile(
            "span/updateName",
            "include",
            &match_config(serde_json::json!({"matchType": "regexp", "spanNames": ["(unclosed"]})),
        )
        .unwrap_err();
        match err {
            ConfigError::InvalidPattern { processor, field, .. } => {
                assert_eq!(processor, "span/updateName");
                assert_eq!(field, "include.spanNames[0]");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
