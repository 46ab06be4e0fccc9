//! Hospital pressure computation
//!
//! Deterministic weighted aggregate of resource occupancy:
//!
//! ```text
//! pressure = min(0.45 · icu_occupied / icu_total
//!              + 0.25 · ward_occupied / ward_total
//!              + 0.20 · staff_load
//!              + 0.10 · min(er_queue_length / 20, 1), 1.0)
//! ```
//!
//! rounded to two decimals. Inputs must have passed
//! [`ResourceSnapshot::validate`]; zero capacity is rejected there, not here.

use crate::models::resource::{HospitalCapacity, ResourceSnapshot};
use serde::{Deserialize, Serialize};

/// Weights of the pressure aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureWeights {
    pub icu: f64,
    pub ward: f64,
    pub staff: f64,
    pub er_queue: f64,

    /// ER queue length at which the ER term saturates
    pub er_queue_saturation: f64,
}

impl Default for PressureWeights {
    fn default() -> Self {
        Self {
            icu: 0.45,
            ward: 0.25,
            staff: 0.20,
            er_queue: 0.10,
            er_queue_saturation: 20.0,
        }
    }
}

impl PressureWeights {
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("icu", self.icu),
            ("ward", self.ward),
            ("staff", self.staff),
            ("er_queue", self.er_queue),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("pressure weight '{}' must be finite and non-negative", name));
            }
        }
        if !self.er_queue_saturation.is_finite() || self.er_queue_saturation <= 0.0 {
            return Err("er_queue_saturation must be positive".to_string());
        }
        Ok(())
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pressure score with the default weights
///
/// # Example
/// ```
/// use hospital_flow_core::{compute_pressure, HospitalCapacity, ResourceSnapshot};
/// use hospital_flow_core::core::time::parse_timestamp;
///
/// let capacity = HospitalCapacity::new("H1", 10, 100);
/// let snapshot = ResourceSnapshot {
///     hospital_id: "H1".to_string(),
///     timestamp: parse_timestamp("2024-03-01 08:00:00").unwrap(),
///     icu_beds_occupied: 9,
///     ward_beds_occupied: 50,
///     staff_load: 0.5,
///     er_queue_length: 10,
/// };
///
/// // 0.405 + 0.125 + 0.10 + 0.05
/// assert_eq!(compute_pressure(&snapshot, &capacity), 0.68);
/// ```
pub fn compute_pressure(snapshot: &ResourceSnapshot, capacity: &HospitalCapacity) -> f64 {
    compute_pressure_with(snapshot, capacity, &PressureWeights::default())
}

/// Pressure score with explicit weights
pub fn compute_pressure_with(
    snapshot: &ResourceSnapshot,
    capacity: &HospitalCapacity,
    weights: &PressureWeights,
) -> f64 {
    let icu_ratio = f64::from(snapshot.icu_beds_occupied) / f64::from(capacity.icu_beds_total);
    let ward_ratio = f64::from(snapshot.ward_beds_occupied) / f64::from(capacity.ward_beds_total);
    let er_ratio = (f64::from(snapshot.er_queue_length) / weights.er_queue_saturation).min(1.0);

    let pressure = weights.icu * icu_ratio
        + weights.ward * ward_ratio
        + weights.staff * snapshot.staff_load
        + weights.er_queue * er_ratio;

    round2(pressure.min(1.0))
}
