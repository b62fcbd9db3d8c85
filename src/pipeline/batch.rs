//! Batch processing.
//!
//! Runs a pipeline over a batch of records and keeps the survivors in
//! their original order.

use crate::record::Record;

use super::chain::{Disposition, Pipeline};

/// Result of processing a batch.
#[derive(Debug)]
pub struct BatchResult {
    pub received_count: usize,
    pub forwarded_count: usize,
    pub dropped_count: usize,
    /// Records to hand to the exporter, in input order.
    pub records: Vec<Record>,
}

impl Pipeline {
    /// Process a batch of records.
    pub fn process_batch(&self, records: Vec<Record>) -> BatchResult {
        let received = records.len();
        let mut forwarded = Vec::with_capacity(received);

        for mut record in records {
            if let Disposition::Forward = self.process(&mut record) {
                forwarded.push(record);
            }
        }

        let dropped = received - forwarded.len();

        log::info!(
            "{} BATCH_COMPLETE received={} forwarded={} dropped={}",
            self.context(),
            received,
            forwarded.len(),
            dropped
        );

        BatchResult {
            received_count: received,
            forwarded_count: forwarded.len(),
            dropped_count: dropped,
            records: forwarded,
        }
    }
}
