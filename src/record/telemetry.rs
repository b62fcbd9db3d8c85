//! Records flowing through the pipeline.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Telemetry signal a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Span,
    Log,
    Metric,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Span => "span",
            RecordKind::Log => "log",
            RecordKind::Metric => "metric",
        }
    }
}

/// Fields no processor owns. They are carried to the exporter unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordContext {
    pub timestamp: Option<DateTime<Utc>>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub parent_span_id: Option<String>,
}

/// A single span, log line or metric point.
///
/// `name` is the span name, `body` the log message and `metric_name` the
/// metric identifier. Only the field matching `kind` is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub kind: RecordKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub context: RecordContext,
}

impl Record {
    fn empty(kind: RecordKind) -> Self {
        Self {
            kind,
            name: String::new(),
            body: None,
            metric_name: None,
            attributes: HashMap::new(),
            context: RecordContext::default(),
        }
    }

    pub fn span(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::empty(RecordKind::Span)
        }
    }

    pub fn log(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::empty(RecordKind::Log)
        }
    }

    pub fn metric(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: Some(metric_name.into()),
            ..Self::empty(RecordKind::Metric)
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_context(mut self, context: RecordContext) -> Self {
        self.context = context;
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|v| v.as_str())
    }

    /// The string name-like dimension for this record's kind: span name,
    /// log body (empty when absent) or metric name (empty when absent).
    pub fn subject(&self) -> &str {
        match self.kind {
            RecordKind::Span => &self.name,
            RecordKind::Log => self.body.as_deref().unwrap_or(""),
            RecordKind::Metric => self.metric_name.as_deref().unwrap_or(""),
        }
    }

    pub fn set_subject(&mut self, value: String) {
        match self.kind {
            RecordKind::Span => self.name = value,
            RecordKind::Log => self.body = Some(value),
            RecordKind::Metric => self.metric_name = Some(value),
        }
    }
}
