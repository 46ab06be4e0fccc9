//! Per-patient sliding window
//!
//! A bounded FIFO of the most recent observations for one patient. Pushing
//! at capacity evicts the oldest observation. Trend computation only runs on
//! a full window.

use crate::models::observation::Observation;
use std::collections::VecDeque;

/// Fixed-capacity, insertion-ordered observation buffer
///
/// # Example
/// ```
/// use hospital_flow_core::{Observation, PatientWindow};
/// use hospital_flow_core::core::time::parse_timestamp;
///
/// let ts = parse_timestamp("2024-03-01 08:00:00").unwrap();
/// let mut window = PatientWindow::new(2);
/// window.push(Observation::new("P1", ts, 80.0, 120.0));
/// window.push(Observation::new("P1", ts, 90.0, 120.0));
/// window.push(Observation::new("P1", ts, 100.0, 120.0));
///
/// assert!(window.is_full());
/// assert_eq!(window.oldest().unwrap().heart_rate(), 90.0);
/// assert_eq!(window.newest().unwrap().heart_rate(), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct PatientWindow {
    capacity: usize,
    observations: VecDeque<Observation>,
}

impl PatientWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            capacity,
            observations: VecDeque::with_capacity(capacity),
        }
    }

    /// Append, evicting the oldest observation when at capacity
    pub fn push(&mut self, observation: Observation) {
        if self.observations.len() == self.capacity {
            self.observations.pop_front();
        }
        self.observations.push_back(observation);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.observations.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fraction of capacity filled, capped at 1.0
    pub fn fill_ratio(&self) -> f64 {
        (self.observations.len() as f64 / self.capacity as f64).min(1.0)
    }

    pub fn oldest(&self) -> Option<&Observation> {
        self.observations.front()
    }

    pub fn newest(&self) -> Option<&Observation> {
        self.observations.back()
    }

    /// Observations from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }
}
