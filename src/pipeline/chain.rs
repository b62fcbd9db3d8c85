//! The ordered processor chain.
//!
//! Built once from configuration and never mutated. `process` is a pure
//! function of (compiled processors, record): no I/O, no shared mutable
//! state, safe to call from any number of threads at once.

use std::collections::HashSet;

use crate::config::model::PipelineConfig;
use crate::error::ConfigError;
use crate::processor::compiled::{Processor, Verdict};
use crate::record::Record;

use super::context::PipelineContext;

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hand the (possibly mutated) record to the exporter.
    Forward,
    /// Dropped by the processor at this index; later processors did not run.
    Dropped { processor: usize },
}

impl Disposition {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Disposition::Dropped { .. })
    }
}

/// Compiled, ordered list of processors.
#[derive(Debug, Clone)]
pub struct Pipeline {
    ctx: PipelineContext,
    processors: Vec<Processor>,
}

impl Pipeline {
    /// A pipeline with no processors; forwards everything unchanged.
    pub fn empty() -> Self {
        Self {
            ctx: PipelineContext::new(0),
            processors: Vec::new(),
        }
    }

    /// Compile every processor in `config`.
    ///
    /// Fails on the first invalid processor; nothing is partially built.
    pub fn build(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let ctx = PipelineContext::new(config.processors.len());

        log::info!("{} PIPELINE_BUILD_START processors={}", ctx, config.processors.len());

        match compile_all(&ctx, config) {
            Ok(processors) => {
                log::info!(
                    "{} PIPELINE_BUILT processors={} ids={:?}",
                    ctx,
                    processors.len(),
                    processors.iter().map(|p| p.id()).collect::<Vec<_>>()
                );
                Ok(Self { ctx, processors })
            }
            Err(e) => {
                log::warn!("{} PIPELINE_BUILD_FAILED error={}", ctx, e);
                Err(e)
            }
        }
    }

    /// Parse and compile a `{ "processors": [...] }` document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config = PipelineConfig::from_json_str(json)?;
        Self::build(&config)
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn pipeline_id(&self) -> &str {
        &self.ctx.pipeline_id
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn processor_ids(&self) -> Vec<String> {
        self.processors.iter().map(|p| p.id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Run every processor over `record`, in order.
    ///
    /// The first processor that drops the record stops the chain.
    pub fn process(&self, record: &mut Record) -> Disposition {
        for (index, processor) in self.processors.iter().enumerate() {
            if processor.process(record) == Verdict::Drop {
                log::debug!(
                    "{} RECORD_DROPPED kind={}",
                    self.ctx.processor_scope(processor.id()),
                    record.kind.as_str()
                );
                return Disposition::Dropped { processor: index };
            }
        }
        Disposition::Forward
    }

    /// Owned variant of `process`: `None` when the record was dropped.
    pub fn process_owned(&self, mut record: Record) -> Option<Record> {
        match self.process(&mut record) {
            Disposition::Forward => Some(record),
            Disposition::Dropped { .. } => None,
        }
    }
}

fn compile_all(
    ctx: &PipelineContext,
    config: &PipelineConfig,
) -> Result<Vec<Processor>, ConfigError> {
    let mut seen = HashSet::new();
    for processor in &config.processors {
        if !seen.insert(processor.id.as_str()) {
            return Err(ConfigError::DuplicateId {
                id: processor.id.clone(),
            });
        }
    }

    config
        .processors
        .iter()
        .map(|processor_config| {
            let processor = Processor::compile(processor_config)?;
            log::debug!(
                "{} PROCESSOR_COMPILED type={} actions={}",
                ctx.processor_scope(processor.id()),
                processor.processor_type().as_str(),
                processor.action_count()
            );
            Ok(processor)
        })
        .collect()
}
