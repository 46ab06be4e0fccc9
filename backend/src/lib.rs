//! Hospital Flow Core - Rust Engine
//!
//! Patient-flow decision support over streaming per-patient vitals.
//!
//! # Architecture
//!
//! - **core**: Timestamp parsing and elapsed-time helpers
//! - **models**: Domain types (Observation, ResourceSnapshot, RiskState, DecisionRecord)
//! - **risk**: Per-patient sliding windows, signal scoring, stabilization decay
//! - **pressure**: Weighted hospital resource pressure
//! - **policy**: Rule-cascade decision engine
//! - **resources**: Validated capacity + snapshot time series
//! - **orchestrator**: Simulation runner, scenario input, run report
//!
//! # Critical Invariants
//!
//! 1. Signal scores are never negative
//! 2. Pressure is in [0, 1], rounded to two decimals
//! 3. Pressure >= 0.90 blocks regardless of risk level
//! 4. Corrupt capacity data is rejected before any decision is computed
//! 5. No process-wide state: each run owns its risk agent

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod pressure;
pub mod resources;
pub mod risk;

// Re-exports for convenience
pub use models::{
    decision::{Action, Decision, DecisionRecord},
    observation::{Observation, ObservationError, ObservationInput},
    resource::{DataIntegrityError, HospitalCapacity, ResourceSnapshot, ResourceState},
    risk::{RiskLevel, RiskState, SignalTag, Trends},
};
pub use orchestrator::{
    count_actions, Scenario, SimulationConfig, SimulationError, SimulationReport, SimulationRunner,
    SnapshotSelection,
};
pub use policy::{decide, DecisionEngine, DecisionPolicy, DecisionThresholds};
pub use pressure::{compute_pressure, compute_pressure_with, PressureWeights};
pub use resources::ResourceModel;
pub use risk::{PatientWindow, RiskAgent, RiskThresholds};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn hospital_flow_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulation::PySimulation>()?;
    m.add_function(wrap_pyfunction!(ffi::simulation::run_simulation, m)?)?;
    Ok(())
}
