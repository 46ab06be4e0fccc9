//! PyO3 wrapper for the simulation runner
//!
//! # Example (from Python)
//!
//! ```python
//! from hospital_flow_core import Simulation
//!
//! sim = Simulation(scenario_json)          # capacity + snapshots only
//! for row in rows:
//!     record = sim.process(row)            # None while the window fills
//!     if record is not None:
//!         print(record["action"], record["reason"])
//! ```

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{observation_input_from_py, record_to_py, records_to_py, to_py_err};
use crate::models::observation::Observation;
use crate::orchestrator::{Scenario, SimulationConfig, SimulationError, SimulationRunner};

fn parse_config(config_json: Option<&str>) -> Result<SimulationConfig, SimulationError> {
    match config_json {
        Some(json) => SimulationConfig::from_json(json),
        None => Ok(SimulationConfig::default()),
    }
}

/// Python handle on one simulation run
#[pyclass(name = "Simulation")]
pub struct PySimulation {
    inner: SimulationRunner,
}

#[pymethods]
impl PySimulation {
    /// Build a run from a scenario document
    ///
    /// Observations in the scenario, if any, are processed immediately.
    ///
    /// # Errors
    ///
    /// Raises ValueError on malformed JSON, invalid config, data integrity
    /// violations, or malformed observation rows.
    #[new]
    #[pyo3(signature = (scenario_json, config_json=None, sort_by_time=false))]
    fn new(scenario_json: &str, config_json: Option<&str>, sort_by_time: bool) -> PyResult<Self> {
        let config = parse_config(config_json).map_err(to_py_err)?;
        let scenario = Scenario::from_json(scenario_json).map_err(to_py_err)?;
        let (resources, observations) = scenario.into_parts(sort_by_time).map_err(to_py_err)?;

        let mut inner = SimulationRunner::new(config, resources).map_err(to_py_err)?;
        inner.run(observations).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Process one observation dict, returning a record dict or None
    fn process<'py>(
        &mut self,
        py: Python<'py>,
        row: &Bound<'py, PyDict>,
    ) -> PyResult<Option<Bound<'py, PyDict>>> {
        let input = observation_input_from_py(row)?;
        let index = self.inner.observations_processed();
        let observation = Observation::try_from(input)
            .map_err(|source| to_py_err(SimulationError::MalformedObservation { index, source }))?;

        match self.inner.process(observation).map_err(to_py_err)? {
            Some(record) => Ok(Some(record_to_py(py, record)?)),
            None => Ok(None),
        }
    }

    /// All records emitted so far
    fn records<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyList>> {
        records_to_py(py, self.inner.records())
    }

    fn observations_processed(&self) -> usize {
        self.inner.observations_processed()
    }
}

/// Run a complete scenario and return the report as JSON
#[pyfunction]
#[pyo3(signature = (scenario_json, config_json=None, sort_by_time=false))]
pub fn run_simulation(scenario_json: &str, config_json: Option<&str>, sort_by_time: bool) -> PyResult<String> {
    let config = parse_config(config_json).map_err(to_py_err)?;
    let report = Scenario::from_json(scenario_json)
        .and_then(|scenario| scenario.run(config, sort_by_time))
        .map_err(to_py_err)?;
    report.to_json_pretty().map_err(to_py_err)
}
