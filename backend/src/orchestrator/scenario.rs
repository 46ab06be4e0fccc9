//! Scenario documents
//!
//! A scenario is the JSON input of a run: one hospital's capacity, its
//! occupancy snapshots, and the raw observation rows. Raw rows are validated
//! here, at the boundary, so the engine only ever sees typed observations.
//!
//! ```json
//! {
//!   "capacity": { "hospital_id": "H1", "icu_beds_total": 10, "ward_beds_total": 120 },
//!   "snapshots": [
//!     { "hospital_id": "H1", "timestamp": "2024-03-01 08:00:00",
//!       "icu_beds_occupied": 6, "ward_beds_occupied": 80,
//!       "staff_load": 0.6, "er_queue_length": 5 }
//!   ],
//!   "observations": [
//!     { "patient_id": "P0001", "timestamp": "2024-03-01 08:00:00",
//!       "heart_rate": 88, "systolic_bp": 121, "troponin": 0.01 }
//!   ]
//! }
//! ```

use crate::models::observation::{Observation, ObservationInput};
use crate::models::resource::{HospitalCapacity, ResourceSnapshot};
use crate::orchestrator::engine::{SimulationConfig, SimulationError, SimulationRunner};
use crate::orchestrator::report::SimulationReport;
use crate::resources::ResourceModel;
use serde::{Deserialize, Serialize};

/// Complete input of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub capacity: HospitalCapacity,

    #[serde(default)]
    pub snapshots: Vec<ResourceSnapshot>,

    #[serde(default)]
    pub observations: Vec<ObservationInput>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::SerializationError(format!("Scenario parse failed: {}", e)))
    }

    /// Validate resources and observations
    ///
    /// With `sort_by_time`, observations are stable-sorted by timestamp, which
    /// keeps each patient's relative order for equal timestamps.
    pub fn into_parts(self, sort_by_time: bool) -> Result<(ResourceModel, Vec<Observation>), SimulationError> {
        let resources = ResourceModel::new(self.capacity, self.snapshots)?;

        let mut observations = self
            .observations
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                Observation::try_from(input)
                    .map_err(|source| SimulationError::MalformedObservation { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if sort_by_time {
            observations.sort_by_key(|o| o.timestamp());
        }

        Ok((resources, observations))
    }

    /// Validate and run the scenario to completion
    pub fn run(self, config: SimulationConfig, sort_by_time: bool) -> Result<SimulationReport, SimulationError> {
        let (resources, observations) = self.into_parts(sort_by_time)?;
        let mut runner = SimulationRunner::new(config, resources)?;
        runner.run(observations)?;
        runner.into_report()
    }
}
