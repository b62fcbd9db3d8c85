//! Python entry points.
//!
//! Records cross the boundary as JSON strings in the `Record` serde shape.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::init_logger;
use crate::pipeline::{current_pipeline, install_pipeline, Pipeline};
use crate::record::Record;

/// Compile processor configuration and install it as the active pipeline.
///
/// # Arguments
/// * `config_json` - `{"processors": [...]}` document
///
/// # Returns
/// Processor ids in evaluation order. Raises `ValueError` on any
/// configuration error; the previous pipeline stays active.
#[pyfunction]
fn load_processors(config_json: String) -> PyResult<Vec<String>> {
    init_logger();

    let pipeline =
        Pipeline::from_json_str(&config_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let ids = pipeline.processor_ids();
    install_pipeline(pipeline);

    Ok(ids)
}

/// Run the active pipeline over a batch of records.
///
/// Entries that are not valid record JSON are skipped and counted in
/// `rejected_count`.
#[pyfunction]
fn process_records(py: Python<'_>, records: Vec<String>) -> PyResult<Py<PyAny>> {
    init_logger();

    let pipeline = current_pipeline();
    let log_ctx = pipeline.context();

    let mut parsed = Vec::with_capacity(records.len());
    let mut rejected = 0usize;
    for record_json in &records {
        match serde_json::from_str::<Record>(record_json) {
            Ok(record) => parsed.push(record),
            Err(e) => {
                log::warn!("{} RECORD_PARSE_FAILED error={}", log_ctx, e);
                rejected += 1;
            }
        }
    }

    let result = pipeline.process_batch(parsed);

    let py_result = PyDict::new(py);
    py_result.set_item("pipeline_id", pipeline.pipeline_id())?;
    py_result.set_item("received_count", records.len())?;
    py_result.set_item("rejected_count", rejected)?;
    py_result.set_item("forwarded_count", result.forwarded_count)?;
    py_result.set_item("dropped_count", result.dropped_count)?;

    let records_list = PyList::empty(py);
    for record in &result.records {
        let json = serde_json::to_string(record).map_err(|e| PyValueError::new_err(e.to_string()))?;
        records_list.append(json)?;
    }
    py_result.set_item("records", records_list)?;

    Ok(py_result.into())
}

/// Get the ids of the active pipeline's processors.
#[pyfunction]
fn processor_ids() -> PyResult<Vec<String>> {
    Ok(current_pipeline().processor_ids())
}

/// Python module definition
#[pymodule]
fn telemetry_processors(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(load_processors, m)?)?;
    m.add_function(wrap_pyfunction!(process_records, m)?)?;
    m.add_function(wrap_pyfunction!(processor_ids, m)?)?;
    Ok(())
}
