//! Hospital resource models
//!
//! A [`HospitalCapacity`] record holds the static bed totals of a hospital.
//! A [`ResourceSnapshot`] holds the occupancy observed at one instant. Both
//! are externally supplied reference data and are never mutated by the engine.
//!
//! # Critical Invariants
//!
//! 1. **Positive Capacity**: bed totals are > 0 (pressure divides by them)
//! 2. **No Overbooking**: occupied beds never exceed the declared total
//! 3. **Same Hospital**: a snapshot is only read against its own capacity record
//!
//! [`ResourceSnapshot::validate`] enforces all three before any pressure or
//! decision computation is allowed to see the data.

use crate::core::time::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capacity data that cannot be used for pressure computation
#[derive(Debug, Error, PartialEq)]
pub enum DataIntegrityError {
    #[error("Data integrity error: {resource} total capacity is zero")]
    ZeroCapacity { resource: &'static str },

    #[error("Data integrity error: ICU occupancy {occupied} exceeds total {total} at {timestamp}")]
    IcuOverCapacity {
        occupied: u32,
        total: u32,
        timestamp: Timestamp,
    },

    #[error("Data integrity error: ward occupancy {occupied} exceeds total {total} at {timestamp}")]
    WardOverCapacity {
        occupied: u32,
        total: u32,
        timestamp: Timestamp,
    },

    #[error("Data integrity error: staff load {value} must be finite and non-negative")]
    InvalidStaffLoad { value: f64 },

    #[error("Data integrity error: snapshot for hospital '{snapshot}' read against capacity of '{capacity}'")]
    HospitalMismatch { snapshot: String, capacity: String },
}

/// Static bed capacity of a hospital
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalCapacity {
    #[serde(default)]
    pub hospital_id: String,

    pub icu_beds_total: u32,

    pub ward_beds_total: u32,
}

impl HospitalCapacity {
    pub fn new(hospital_id: impl Into<String>, icu_beds_total: u32, ward_beds_total: u32) -> Self {
        Self {
            hospital_id: hospital_id.into(),
            icu_beds_total,
            ward_beds_total,
        }
    }

    /// Reject capacities that would make pressure undefined
    pub fn validate(&self) -> Result<(), DataIntegrityError> {
        if self.icu_beds_total == 0 {
            return Err(DataIntegrityError::ZeroCapacity { resource: "ICU" });
        }
        if self.ward_beds_total == 0 {
            return Err(DataIntegrityError::ZeroCapacity { resource: "ward" });
        }
        Ok(())
    }
}

/// Hospital occupancy at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    #[serde(default)]
    pub hospital_id: String,

    #[serde(with = "crate::core::time::flexible")]
    pub timestamp: Timestamp,

    pub icu_beds_occupied: u32,

    pub ward_beds_occupied: u32,

    /// Fraction of staff capacity in use (1.0 = fully loaded)
    pub staff_load: f64,

    pub er_queue_length: u32,
}

impl ResourceSnapshot {
    /// Check this snapshot against the capacity it will be read with
    ///
    /// # Example
    /// ```
    /// use hospital_flow_core::{DataIntegrityError, HospitalCapacity, ResourceSnapshot};
    /// use hospital_flow_core::core::time::parse_timestamp;
    ///
    /// let capacity = HospitalCapacity::new("H1", 10, 100);
    /// let snapshot = ResourceSnapshot {
    ///     hospital_id: "H1".to_string(),
    ///     timestamp: parse_timestamp("2024-03-01 08:00:00").unwrap(),
    ///     icu_beds_occupied: 11,
    ///     ward_beds_occupied: 40,
    ///     staff_load: 0.5,
    ///     er_queue_length: 3,
    /// };
    ///
    /// assert!(matches!(
    ///     snapshot.validate(&capacity),
    ///     Err(DataIntegrityError::IcuOverCapacity { occupied: 11, total: 10, .. })
    /// ));
    /// ```
    pub fn validate(&self, capacity: &HospitalCapacity) -> Result<(), DataIntegrityError> {
        capacity.validate()?;

        if self.hospital_id != capacity.hospital_id {
            return Err(DataIntegrityError::HospitalMismatch {
                snapshot: self.hospital_id.clone(),
                capacity: capacity.hospital_id.clone(),
            });
        }
        if self.icu_beds_occupied > capacity.icu_beds_total {
            return Err(DataIntegrityError::IcuOverCapacity {
                occupied: self.icu_beds_occupied,
                total: capacity.icu_beds_total,
                timestamp: self.timestamp,
            });
        }
        if self.ward_beds_occupied > capacity.ward_beds_total {
            return Err(DataIntegrityError::WardOverCapacity {
                occupied: self.ward_beds_occupied,
                total: capacity.ward_beds_total,
                timestamp: self.timestamp,
            });
        }
        if !self.staff_load.is_finite() || self.staff_load < 0.0 {
            return Err(DataIntegrityError::InvalidStaffLoad {
                value: self.staff_load,
            });
        }
        Ok(())
    }
}

/// Resource view handed to the decision engine
///
/// Built once per decision from a validated snapshot, its capacity, and the
/// pressure computed from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub pressure: f64,

    /// No free ICU bed (occupied >= total)
    pub icu_full: bool,

    pub icu_beds_available: u32,

    pub ward_beds_available: u32,
}

impl ResourceState {
    pub fn build(snapshot: &ResourceSnapshot, capacity: &HospitalCapacity, pressure: f64) -> Self {
        Self {
            pressure,
            icu_full: snapshot.icu_beds_occupied >= capacity.icu_beds_total,
            icu_beds_available: capacity
                .icu_beds_total
                .saturating_sub(snapshot.icu_beds_occupied),
            ward_beds_available: capacity
                .ward_beds_total
                .saturating_sub(snapshot.ward_beds_occupied),
        }
    }

    /// Resource state with only pressure and ICU availability set
    pub fn with_pressure(pressure: f64, icu_full: bool) -> Self {
        Self {
            pressure,
            icu_full,
            icu_beds_available: 0,
            ward_beds_available: 0,
        }
    }
}
