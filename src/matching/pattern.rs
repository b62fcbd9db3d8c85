//! Guarded regular expression compilation.
//!
//! Every operator-supplied pattern is compiled here, once, at pipeline
//! build time. The `regex` crate runs in time linear in the input, so the
//! remaining cost is the compiled program size, which is capped.

use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};

use crate::error::ConfigError;

/// Longest pattern source accepted, in bytes.
pub const MAX_PATTERN_LEN: usize = 4096;
/// Compiled program size limit per pattern.
pub const REGEX_SIZE_LIMIT: usize = 1 << 20; // 1 MiB
/// Lazy DFA cache limit per pattern.
pub const DFA_SIZE_LIMIT: usize = 2 << 20; // 2 MiB

/// How a pattern is applied to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchoring {
    /// The whole input must match.
    Full,
    /// The first occurrence anywhere in the input.
    Search,
}

fn source_for(pattern: &str, anchoring: Anchoring) -> String {
    match anchoring {
        Anchoring::Full => format!("^(?:{})$", pattern),
        Anchoring::Search => pattern.to_string(),
    }
}

fn check_length(processor: &str, field: &str, pattern: &str) -> Result<(), ConfigError> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(ConfigError::InvalidPattern {
            processor: processor.to_string(),
            field: field.to_string(),
            pattern: format!("{}...", pattern.chars().take(32).collect::<String>()),
            reason: format!("pattern exceeds {} bytes", MAX_PATTERN_LEN),
        });
    }
    Ok(())
}

fn build_guarded(source: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(DFA_SIZE_LIMIT)
        .build()
}

fn invalid_pattern(processor: &str, field: &str, pattern: &str, e: regex::Error) -> ConfigError {
    ConfigError::InvalidPattern {
        processor: processor.to_string(),
        field: field.to_string(),
        pattern: pattern.to_string(),
        reason: e.to_string(),
    }
}

/// Compile a single pattern with the size guards applied.
///
/// The pattern must be valid on its own before it is anchored, so text
/// like `a)|(b` cannot close the anchoring group early.
pub fn compile_pattern(
    processor: &str,
    field: &str,
    pattern: &str,
    anchoring: Anchoring,
) -> Result<Regex, ConfigError> {
    check_length(processor, field, pattern)?;

    let raw = build_guarded(pattern).map_err(|e| invalid_pattern(processor, field, pattern, e))?;
    match anchoring {
        Anchoring::Search => Ok(raw),
        Anchoring::Full => build_guarded(&source_for(pattern, anchoring))
            .map_err(|e| invalid_pattern(processor, field, pattern, e)),
    }
}

/// Compile a list of patterns into a set answering "matches any".
///
/// Each pattern is first compiled on its own so a bad entry is reported
/// with its index.
pub fn compile_pattern_set(
    processor: &str,
    field: &str,
    patterns: &[String],
    anchoring: Anchoring,
) -> Result<RegexSet, ConfigError> {
    for (i, pattern) in patterns.iter().enumerate() {
        compile_pattern(processor, &format!("{}[{}]", field, i), pattern, anchoring)?;
    }

    RegexSetBuilder::new(patterns.iter().map(|p| source_for(p, anchoring)))
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(DFA_SIZE_LIMIT)
        .build()
        .map_err(|e| ConfigError::InvalidPattern {
            processor: processor.to_string(),
            field: field.to_string(),
            pattern: patterns.join(", "),
            reason: e.to_string(),
        })
}

/// Named capture groups of a compiled regex, in group order.
pub fn named_groups(regex: &Regex) -> Vec<String> {
    regex
        .capture_names()
        .flatten()
        .map(|name| name.to_string())
        .collect()
}

/// A compiled pattern together with its named groups.
#[derive(Debug, Clone)]
pub struct RegexSpec {
    pub regex: Regex,
    pub group_names: Vec<String>,
    /// Pattern as configured, before anchoring.
    pub pattern: String,
}

impl RegexSpec {
    /// Compile `pattern` and reconcile its groups with `declared`.
    ///
    /// `declared` must list exactly the pattern's named groups in order;
    /// when omitted the groups are taken from the pattern.
    pub fn compile(
        processor: &str,
        field: &str,
        pattern: &str,
        anchoring: Anchoring,
        declared: Option<&[String]>,
    ) -> Result<Self, ConfigError> {
        let regex = compile_pattern(processor, field, pattern, anchoring)?;
        let found = named_groups(&regex);

        if let Some(expected) = declared {
            if expected != found.as_slice() {
                return Err(ConfigError::GroupNameMismatch {
                    processor: processor.to_string(),
                    field: field.to_string(),
                    expected: expected.to_vec(),
                    found,
                });
            }
        }

        Ok(Self {
            regex,
            group_names: found,
            pattern: pattern.to_string(),
        })
    }

    /// Fail unless the pattern declares at least one named group.
    pub fn require_groups(self, processor: &str, field: &str) -> Result<Self, ConfigError> {
        if self.group_names.is_empty() {
            return Err(ConfigError::invalid_value(
                processor,
                field,
                format!("pattern '{}' has no named groups", self.pattern),
            ));
        }
        Ok(self)
    }
}
