//! Simulation Runner
//!
//! Drives the risk agent, pressure calculator and decision policy over an
//! ordered stream of observations.
//!
//! # Architecture
//!
//! ```text
//! For each observation (caller supplies per-patient chronological order):
//! 1. RiskAgent.observe
//! 2. RiskAgent.update → None: skip silently (window not full)
//! 3. Select resource snapshot (latest, or as of the observation)
//! 4. Compute pressure and build the resource state
//! 5. Decide (action, reason)
//! 6. Append a DecisionRecord
//! ```
//!
//! # Example
//!
//! ```rust
//! use hospital_flow_core::{
//!     Action, HospitalCapacity, Observation, ResourceModel, ResourceSnapshot,
//!     SimulationConfig, SimulationRunner,
//! };
//! use hospital_flow_core::core::time::parse_timestamp;
//!
//! let capacity = HospitalCapacity::new("H1", 10, 100);
//! let snapshot = ResourceSnapshot {
//!     hospital_id: "H1".to_string(),
//!     timestamp: parse_timestamp("2024-03-01 07:00:00").unwrap(),
//!     icu_beds_occupied: 5,
//!     ward_beds_occupied: 50,
//!     staff_load: 0.5,
//!     er_queue_length: 4,
//! };
//! let resources = ResourceModel::new(capacity, vec![snapshot]).unwrap();
//!
//! let config = SimulationConfig { window_size: 2, ..Default::default() };
//! let mut runner = SimulationRunner::new(config, resources).unwrap();
//!
//! let t0 = parse_timestamp("2024-03-01 08:00:00").unwrap();
//! let t1 = parse_timestamp("2024-03-01 08:15:00").unwrap();
//! assert!(runner.process(Observation::new("P1", t0, 80.0, 120.0)).unwrap().is_none());
//!
//! let record = runner.process(Observation::new("P1", t1, 82.0, 118.0)).unwrap().unwrap();
//! assert_eq!(record.action, Action::Observe);
//! assert_eq!(record.reason, "Risk stable");
//! ```

use crate::core::time::Timestamp;
use crate::models::decision::DecisionRecord;
use crate::models::observation::{Observation, ObservationError};
use crate::models::resource::{DataIntegrityError, ResourceState};
use crate::orchestrator::report::{compute_config_hash, SimulationReport};
use crate::policy::{DecisionEngine, DecisionPolicy, DecisionThresholds};
use crate::pressure::{compute_pressure_with, PressureWeights};
use crate::resources::ResourceModel;
use crate::risk::{RiskAgent, RiskThresholds};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// Configuration Types
// ============================================================================

/// Which resource snapshot a decision is computed against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSelection {
    /// Newest snapshot of the run, for every decision
    #[default]
    Latest,

    /// Newest snapshot taken at or before the observation
    AsOfObservation,
}

/// Complete run configuration
///
/// Every field has a default; a JSON config only needs the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Observations per patient window
    pub window_size: usize,

    pub risk: RiskThresholds,

    pub pressure: PressureWeights,

    pub decision: DecisionThresholds,

    pub snapshot_selection: SnapshotSelection,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            risk: RiskThresholds::default(),
            pressure: PressureWeights::default(),
            decision: DecisionThresholds::default(),
            snapshot_selection: SnapshotSelection::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimulationError::SerializationError(format!("Config parse failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.window_size == 0 {
            return Err(SimulationError::InvalidConfig(
                "window_size must be positive".to_string(),
            ));
        }
        self.risk.validate().map_err(SimulationError::InvalidConfig)?;
        self.pressure.validate().map_err(SimulationError::InvalidConfig)?;
        self.decision.validate().map_err(SimulationError::InvalidConfig)?;
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Observation #{index} rejected: {source}")]
    MalformedObservation {
        index: usize,
        #[source]
        source: ObservationError,
    },

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("No resource snapshot available at {at}")]
    NoResourceSnapshot { at: Timestamp },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Runner
// ============================================================================

/// One simulation run
///
/// Owns the risk agent (and so all per-patient state) for the lifetime of
/// the run. Nothing is shared between runs.
pub struct SimulationRunner {
    config: SimulationConfig,
    risk_agent: RiskAgent,
    resources: ResourceModel,
    policy: Box<dyn DecisionPolicy>,
    records: Vec<DecisionRecord>,
    observations_processed: usize,
}

impl SimulationRunner {
    /// Create a runner with the rule-cascade decision engine
    pub fn new(config: SimulationConfig, resources: ResourceModel) -> Result<Self, SimulationError> {
        config.validate()?;
        let risk_agent = RiskAgent::with_thresholds(config.window_size, config.risk.clone());
        let policy = Box::new(DecisionEngine::new(config.decision.clone()));

        Ok(Self {
            config,
            risk_agent,
            resources,
            policy,
            records: Vec::new(),
            observations_processed: 0,
        })
    }

    /// Replace the decision policy
    pub fn with_policy(mut self, policy: Box<dyn DecisionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Feed one observation through the pipeline
    ///
    /// Returns the appended record, or `None` while the patient's window is
    /// still filling.
    ///
    /// On error the runner is unchanged: the observation is neither counted
    /// nor added to the patient's window.
    pub fn process(&mut self, observation: Observation) -> Result<Option<&DecisionRecord>, SimulationError> {
        let patient_id = observation.patient_id().to_string();
        let timestamp = observation.timestamp();

        // Resolved before any state changes
        let snapshot = match self.config.snapshot_selection {
            SnapshotSelection::Latest => self.resources.latest(),
            SnapshotSelection::AsOfObservation => self.resources.as_of(timestamp),
        };
        if snapshot.is_none() && self.risk_agent.fills_window_with_next(&patient_id) {
            return Err(SimulationError::NoResourceSnapshot { at: timestamp });
        }

        self.observations_processed += 1;
        self.risk_agent.observe(observation);
        let Some(risk) = self.risk_agent.update(&patient_id) else {
            return Ok(None);
        };
        let snapshot = snapshot.ok_or(SimulationError::NoResourceSnapshot { at: timestamp })?;

        let capacity = self.resources.capacity();
        let pressure = compute_pressure_with(snapshot, capacity, &self.config.pressure);
        let resource_state = ResourceState::build(snapshot, capacity, pressure);
        let decision = self.policy.decide(risk, &resource_state);

        debug!(
            patient_id = %patient_id,
            risk_level = %risk.risk_level,
            score = risk.signal_score,
            pressure,
            action = %decision.action,
            "decision made"
        );

        self.records.push(DecisionRecord {
            timestamp,
            patient_id,
            risk_level: risk.risk_level,
            signal_score: risk.signal_score,
            action: decision.action,
            reason: decision.reason.to_string(),
            pressure,
        });

        Ok(self.records.last())
    }

    /// Process every observation in order, stopping at the first error
    pub fn run<I>(&mut self, observations: I) -> Result<&[DecisionRecord], SimulationError>
    where
        I: IntoIterator<Item = Observation>,
    {
        info!(
            window_size = self.config.window_size,
            snapshots = self.resources.snapshots().len(),
            "simulation started"
        );

        for observation in observations {
            self.process(observation)?;
        }

        info!(
            observations = self.observations_processed,
            decisions = self.records.len(),
            patients = self.risk_agent.num_patients(),
            "simulation finished"
        );

        Ok(&self.records)
    }

    /// Decision records in emission order
    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    pub fn risk_agent(&self) -> &RiskAgent {
        &self.risk_agent
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn observations_processed(&self) -> usize {
        self.observations_processed
    }

    /// Close the run and package its output
    pub fn into_report(self) -> Result<SimulationReport, SimulationError> {
        Ok(SimulationReport {
            run_id: Uuid::new_v4(),
            config_hash: compute_config_hash(&self.config)?,
            window_size: self.config.window_size,
            observations_processed: self.observations_processed,
            records: self.records,
        })
    }
}
