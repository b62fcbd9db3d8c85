//! Pipeline publication and reload.
//!
//! A reload builds a complete new `Pipeline` first and then swaps a single
//! `Arc` under a write lock. Callers holding the previous `Arc` finish
//! against the old processor list. A failed build leaves the current
//! pipeline in place.

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::error::ConfigError;

use super::chain::Pipeline;

/// Shared, swappable reference to the active pipeline.
#[derive(Debug)]
pub struct PipelineHandle {
    current: RwLock<Arc<Pipeline>>,
}

impl Default for PipelineHandle {
    fn default() -> Self {
        Self::new(Pipeline::empty())
    }
}

impl PipelineHandle {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            current: RwLock::new(Arc::new(pipeline)),
        }
    }

    /// Snapshot of the active pipeline. The lock is held only for the clone.
    pub fn load(&self) -> Arc<Pipeline> {
        Arc::clone(&self.current.read())
    }

    /// Publish `next` and return the pipeline it replaced.
    pub fn swap(&self, next: Pipeline) -> Arc<Pipeline> {
        let next = Arc::new(next);
        let new_id = next.pipeline_id().to_string();
        let old = std::mem::replace(&mut *self.current.write(), next);

        log::info!(
            "{} PIPELINE_SWAPPED old={} new={}",
            old.context(),
            old.pipeline_id(),
            new_id
        );

        old
    }

    /// Build from JSON and publish on success.
    pub fn reload_from_json(&self, json: &str) -> Result<Arc<Pipeline>, ConfigError> {
        let next = Pipeline::from_json_str(json)?;
        self.swap(next);
        Ok(self.load())
    }
}

lazy_static! {
    static ref GLOBAL_PIPELINE: PipelineHandle = PipelineHandle::default();
}

/// Process-wide pipeline handle.
pub fn global_pipeline() -> &'static PipelineHandle {
    &GLOBAL_PIPELINE
}

/// Snapshot of the process-wide pipeline.
pub fn current_pipeline() -> Arc<Pipeline> {
    GLOBAL_PIPELINE.load()
}

/// Replace the process-wide pipeline, returning the previous one.
pub fn install_pipeline(pipeline: Pipeline) -> Arc<Pipeline> {
    GLOBAL_PIPELINE.swap(pipeline)
}
