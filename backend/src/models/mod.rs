//! Domain models for the hospital flow engine

pub mod decision;
pub mod observation;
pub mod resource;
pub mod risk;

// Re-exports
pub use decision::{Action, Decision, DecisionRecord};
pub use observation::{Observation, ObservationError, ObservationInput};
pub use resource::{DataIntegrityError, HospitalCapacity, ResourceSnapshot, ResourceState};
pub use risk::{RiskLevel, RiskState, SignalTag, Trends};
