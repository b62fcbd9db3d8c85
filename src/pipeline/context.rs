//! Pipeline context management.
//!
//! Identifies one compiled pipeline instance across reloads. The context
//! is also the log line prefix: `[pipeline=<id>]`, or
//! `[pipeline=<id>] [processor=<id>]` when scoped to one processor.
//! Both forms borrow, so formatting them on the record path allocates
//! nothing beyond the log line itself.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Context for one compiled pipeline.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub pipeline_id: String,
    pub built_at: DateTime<Utc>,
    pub processor_count: usize,
}

impl PipelineContext {
    pub fn new(processor_count: usize) -> Self {
        let pipeline_id = format!("pipeline-{}", &Uuid::new_v4().to_string()[..8]);

        Self {
            pipeline_id,
            built_at: Utc::now(),
            processor_count,
        }
    }

    /// Log prefix scoped to one processor of this pipeline.
    pub fn processor_scope<'a>(&'a self, processor_id: &'a str) -> ProcessorScope<'a> {
        ProcessorScope {
            pipeline_id: &self.pipeline_id,
            processor_id,
        }
    }
}

impl fmt::Display for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[pipeline={}]", self.pipeline_id)
    }
}

/// `[pipeline=..] [processor=..]` log prefix.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorScope<'a> {
    pipeline_id: &'a str,
    processor_id: &'a str,
}

impl fmt::Display for ProcessorScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[pipeline={}] [processor={}]", self.pipeline_id, self.processor_id)
    }
}
