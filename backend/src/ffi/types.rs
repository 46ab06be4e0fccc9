//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList).

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::models::decision::DecisionRecord;
use crate::models::observation::ObservationInput;
use crate::orchestrator::SimulationError;

/// Map a core error to a Python `ValueError`
pub fn to_py_err(err: SimulationError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Extract an optional field from a Python dict
///
/// Missing keys and explicit `None` both yield `Ok(None)`; only a failed
/// type conversion is an error.
fn extract_optional<'py, T>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<Option<T>>
where
    T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

/// Read a raw observation row from a Python dict
///
/// Accepts `systolic_bp` when `sbp` is absent. The timestamp must be a
/// string; validation happens in the core.
pub fn observation_input_from_py(dict: &Bound<'_, PyDict>) -> PyResult<ObservationInput> {
    Ok(ObservationInput {
        patient_id: extract_optional(dict, "patient_id")?,
        timestamp: extract_optional(dict, "timestamp")?,
        heart_rate: extract_optional(dict, "heart_rate")?,
        sbp: extract_optional(dict, "sbp")?,
        systolic_bp: extract_optional(dict, "systolic_bp")?,
        troponin: extract_optional(dict, "troponin")?,
        ck_mb: extract_optional(dict, "ck_mb")?,
        requires_icu: extract_optional(dict, "requires_icu")?,
    })
}

/// Convert a decision record to a Python dict
pub fn record_to_py<'py>(py: Python<'py>, record: &DecisionRecord) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("timestamp", record.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())?;
    dict.set_item("patient_id", &record.patient_id)?;
    dict.set_item("risk_level", record.risk_level.as_str())?;
    dict.set_item("signal_score", record.signal_score)?;
    dict.set_item("action", record.action.as_str())?;
    dict.set_item("reason", &record.reason)?;
    dict.set_item("pressure", record.pressure)?;
    Ok(dict)
}

/// Convert a slice of records to a Python list of dicts
pub fn records_to_py<'py>(py: Python<'py>, records: &[DecisionRecord]) -> PyResult<Bound<'py, PyList>> {
    let list = PyList::empty_bound(py);
    for record in records {
        list.append(record_to_py(py, record)?)?;
    }
    Ok(list)
}
