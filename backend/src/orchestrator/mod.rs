//! Orchestrator - simulation run loop
//!
//! See `engine.rs` for the runner, `scenario.rs` for the JSON input
//! document and `report.rs` for the run output.

pub mod engine;
pub mod report;
pub mod scenario;

// Re-export main types for convenience
pub use engine::{SimulationConfig, SimulationError, SimulationRunner, SnapshotSelection};
pub use report::{compute_config_hash, count_actions, SimulationReport};
pub use scenario::Scenario;
