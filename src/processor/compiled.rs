//! Processor compilation and per-record dispatch.

use crate::actions::executor::{self, Action};
use crate::config::model::{MatchConfig, ProcessorConfig, ProcessorType};
use crate::error::ConfigError;
use crate::matching::matcher::{matches, Matcher};
use crate::record::{Record, RecordKind};
use crate::rewrite::rewriter::Rewriter;

/// Outcome of running one processor over a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Drop,
}

#[derive(Debug, Clone)]
enum Effect {
    Actions(Vec<Action>),
    Rewrite(Rewriter),
    /// Metric filters: drop whatever `exclude` selects.
    DropExcluded,
}

/// A processor compiled from its configuration. Immutable once built.
#[derive(Debug, Clone)]
pub struct Processor {
    id: String,
    processor_type: ProcessorType,
    include: Option<Matcher>,
    exclude: Option<Matcher>,
    effect: Effect,
}

impl Processor {
    pub fn compile(config: &ProcessorConfig) -> Result<Self, ConfigError> {
        let id = config.id.as_str();
        if id.is_empty() {
            return Err(ConfigError::invalid_value("<unnamed>", "id", "processor id is empty"));
        }

        check_sections(config)?;
        if let Some(include) = &config.include {
            check_dimensions(id, config.processor_type, "include", include)?;
        }
        if let Some(exclude) = &config.exclude {
            check_dimensions(id, config.processor_type, "exclude", exclude)?;
        }

        let include = config
            .include
            .as_ref()
            .map(|m| Matcher::compile(id, "include", m))
            .transpose()?;
        let exclude = config
            .exclude
            .as_ref()
            .map(|m| Matcher::compile(id, "exclude", m))
            .transpose()?;

        let effect = match config.processor_type {
            ProcessorType::Attribute => {
                let actions = config
                    .actions
                    .as_deref()
                    .ok_or_else(|| ConfigError::missing(id, "actions"))?;
                if actions.is_empty() {
                    return Err(ConfigError::invalid_value(
                        id,
                        "actions",
                        "at least one action is required",
                    ));
                }
                let compiled = actions
                    .iter()
                    .enumerate()
                    .map(|(i, action)| Action::compile(id, i, action))
                    .collect::<Result<Vec<_>, _>>()?;
                Effect::Actions(compiled)
            }
            ProcessorType::Log => {
                let body = config.body.as_ref().ok_or_else(|| ConfigError::missing(id, "body"))?;
                Effect::Rewrite(Rewriter::compile(id, "body", body)?)
            }
            ProcessorType::Span => {
                let name = config.name.as_ref().ok_or_else(|| ConfigError::missing(id, "name"))?;
                Effect::Rewrite(Rewriter::compile(id, "name", name)?)
            }
            ProcessorType::MetricFilter => Effect::DropExcluded,
        };

        Ok(Self {
            id: config.id.clone(),
            processor_type: config.processor_type,
            include,
            exclude,
            effect,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn processor_type(&self) -> ProcessorType {
        self.processor_type
    }

    /// Number of compiled attribute actions (zero for other types).
    pub fn action_count(&self) -> usize {
        match &self.effect {
            Effect::Actions(actions) => actions.len(),
            _ => 0,
        }
    }

    /// Record kinds this processor looks at. Others pass through untouched.
    pub fn applies_to(&self, kind: RecordKind) -> bool {
        match self.processor_type {
            ProcessorType::Attribute => matches!(kind, RecordKind::Span | RecordKind::Log),
            ProcessorType::Log => kind == RecordKind::Log,
            ProcessorType::Span => kind == RecordKind::Span,
            ProcessorType::MetricFilter => kind == RecordKind::Metric,
        }
    }

    pub fn process(&self, record: &mut Record) -> Verdict {
        if !self.applies_to(record.kind) {
            return Verdict::Keep;
        }

        match &self.effect {
            Effect::DropExcluded => match &self.exclude {
                Some(exclude) if exclude.is_match(record) => Verdict::Drop,
                _ => Verdict::Keep,
            },
            Effect::Actions(actions) => {
                if matches(self.include.as_ref(), self.exclude.as_ref(), record) {
                    executor::apply(actions, record);
                }
                Verdict::Keep
            }
            Effect::Rewrite(rewriter) => {
                if matches(self.include.as_ref(), self.exclude.as_ref(), record) {
                    rewriter.apply(record);
                }
                Verdict::Keep
            }
        }
    }
}

/// Reject sections that do not belong to the processor type.
fn check_sections(config: &ProcessorConfig) -> Result<(), ConfigError> {
    let id = config.id.as_str();
    let kind = config.processor_type.as_str();
    let illegal = |field: &str| {
        ConfigError::illegal(id, field, format!("not allowed on '{}' processors", kind))
    };

    if config.actions.is_some() && config.processor_type != ProcessorType::Attribute {
        return Err(illegal("actions"));
    }
    if config.body.is_some() && config.processor_type != ProcessorType::Log {
        return Err(illegal("body"));
    }
    if config.name.is_some() && config.processor_type != ProcessorType::Span {
        return Err(illegal("name"));
    }
    if config.processor_type == ProcessorType::MetricFilter {
        if config.include.is_some() {
            return Err(illegal("include"));
        }
        if config.exclude.is_none() {
            return Err(ConfigError::missing(id, "exclude"));
        }
    }
    Ok(())
}

/// Reject match dimensions that can never apply to the processor type.
fn check_dimensions(
    id: &str,
    processor_type: ProcessorType,
    field: &str,
    config: &MatchConfig,
) -> Result<(), ConfigError> {
    let (span_ok, log_ok, metric_ok, attributes_ok) = match processor_type {
        ProcessorType::Attribute => (true, true, false, true),
        ProcessorType::Log => (false, true, false, true),
        ProcessorType::Span => (true, false, false, true),
        ProcessorType::MetricFilter => (false, false, true, false),
    };
    let kind = processor_type.as_str();
    let check = |populated: bool, allowed: bool, dimension: &str| {
        if populated && !allowed {
            Err(ConfigError::illegal(
                id,
                &format!("{}.{}", field, dimension),
                format!("not applicable to '{}' processors", kind),
            ))
        } else {
            Ok(())
        }
    };

    check(!config.span_names.is_empty(), span_ok, "spanNames")?;
    check(!config.log_bodies.is_empty(), log_ok, "logBodies")?;
    check(!config.metric_names.is_empty(), metric_ok, "metricNames")?;
    check(!config.attributes.is_empty(), attributes_ok, "attributes")?;

    if processor_type == ProcessorType::MetricFilter && config.metric_names.is_empty() {
        return Err(ConfigError::missing(id, &format!("{}.metricNames", field)));
    }
    Ok(())
}
