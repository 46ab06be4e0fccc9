//! Run Report
//!
//! Packages the output of one run together with enough provenance to tell
//! runs apart: a random run id and a hash of the configuration (thresholds,
//! weights, window size) that produced the decisions.

use crate::models::decision::{Action, DecisionRecord};
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use uuid::Uuid;

/// Output of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,

    /// SHA256 of the canonical JSON form of the run config
    pub config_hash: String,

    pub window_size: usize,

    pub observations_processed: usize,

    /// Decision records in emission order
    pub records: Vec<DecisionRecord>,
}

impl SimulationReport {
    /// Last record of each patient, patients in first-decision order
    pub fn final_per_patient(&self) -> Vec<&DecisionRecord> {
        let mut slot: HashMap<&str, usize> = HashMap::new();
        let mut finals: Vec<&DecisionRecord> = Vec::new();

        for record in &self.records {
            match slot.get(record.patient_id.as_str()) {
                Some(&i) => finals[i] = record,
                None => {
                    slot.insert(record.patient_id.as_str(), finals.len());
                    finals.push(record);
                }
            }
        }
        finals
    }

    /// Records of one patient in emission order
    pub fn for_patient<'a>(&'a self, patient_id: &'a str) -> impl Iterator<Item = &'a DecisionRecord> + 'a {
        self.records.iter().filter(move |r| r.patient_id == patient_id)
    }

    pub fn last_for_patient(&self, patient_id: &str) -> Option<&DecisionRecord> {
        self.records.iter().rev().find(|r| r.patient_id == patient_id)
    }

    /// Record count per action, in [`Action::ALL`] order (zero counts included)
    pub fn action_counts(&self) -> Vec<(Action, usize)> {
        count_actions(&self.records)
    }

    pub fn to_json_pretty(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SimulationError::SerializationError(format!("Report serialization failed: {}", e))
        })
    }
}

/// Count any subset of records per action, in [`Action::ALL`] order
pub fn count_actions<'a, I>(records: I) -> Vec<(Action, usize)>
where
    I: IntoIterator<Item = &'a DecisionRecord>,
{
    let mut counts: Vec<(Action, usize)> = Action::ALL.iter().map(|&action| (action, 0)).collect();
    for record in records {
        if let Some(slot) = counts.iter_mut().find(|(action, _)| *action == record.action) {
            slot.1 += 1;
        }
    }
    counts
}

/// Compute a deterministic hash of a configuration
///
/// Uses canonical JSON serialization with sorted keys, so field order in
/// the source document does not change the hash.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
