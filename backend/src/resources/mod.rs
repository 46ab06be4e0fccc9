//! Validated hospital resource model
//!
//! Holds one hospital's static capacity and its time series of occupancy
//! snapshots. Every snapshot is checked against the capacity when the model
//! is built, so a model that exists is safe to compute pressure from.

use crate::core::time::Timestamp;
use crate::models::resource::{DataIntegrityError, HospitalCapacity, ResourceSnapshot};
use tracing::debug;

/// Capacity plus chronologically ordered snapshots
///
/// # Example
/// ```
/// use hospital_flow_core::{HospitalCapacity, ResourceModel, ResourceSnapshot};
/// use hospital_flow_core::core::time::parse_timestamp;
///
/// let snap = |ts: &str, icu: u32| ResourceSnapshot {
///     hospital_id: "H1".to_string(),
///     timestamp: parse_timestamp(ts).unwrap(),
///     icu_beds_occupied: icu,
///     ward_beds_occupied: 10,
///     staff_load: 0.3,
///     er_queue_length: 0,
/// };
///
/// let model = ResourceModel::new(
///     HospitalCapacity::new("H1", 10, 50),
///     vec![snap("2024-03-01 10:00:00", 7), snap("2024-03-01 08:00:00", 4)],
/// )
/// .unwrap();
///
/// assert_eq!(model.latest().unwrap().icu_beds_occupied, 7);
/// let at_nine = parse_timestamp("2024-03-01 09:00:00").unwrap();
/// assert_eq!(model.as_of(at_nine).unwrap().icu_beds_occupied, 4);
/// ```
#[derive(Debug, Clone)]
pub struct ResourceModel {
    capacity: HospitalCapacity,
    snapshots: Vec<ResourceSnapshot>,
}

impl ResourceModel {
    /// Validate capacity and every snapshot, then order snapshots by time
    ///
    /// Snapshots sharing a timestamp keep their input order.
    pub fn new(
        capacity: HospitalCapacity,
        mut snapshots: Vec<ResourceSnapshot>,
    ) -> Result<Self, DataIntegrityError> {
        capacity.validate()?;
        for snapshot in &snapshots {
            snapshot.validate(&capacity)?;
        }
        snapshots.sort_by_key(|s| s.timestamp);

        debug!(
            hospital_id = %capacity.hospital_id,
            snapshots = snapshots.len(),
            "resource model validated"
        );

        Ok(Self {
            capacity,
            snapshots,
        })
    }

    pub fn capacity(&self) -> &HospitalCapacity {
        &self.capacity
    }

    /// Snapshots from oldest to newest
    pub fn snapshots(&self) -> &[ResourceSnapshot] {
        &self.snapshots
    }

    /// Newest snapshot overall
    pub fn latest(&self) -> Option<&ResourceSnapshot> {
        self.snapshots.last()
    }

    /// Newest snapshot taken at or before `at`
    pub fn as_of(&self, at: Timestamp) -> Option<&ResourceSnapshot> {
        let idx = self.snapshots.partition_point(|s| s.timestamp <= at);
        idx.checked_sub(1).map(|i| &self.snapshots[i])
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
