//! Risk Agent
//!
//! Stateful per-patient tracker. For each patient it owns a sliding
//! [`PatientWindow`] and one [`RiskState`] that is updated in place.
//!
//! # Update pipeline
//!
//! ```text
//! update(patient_id):
//! 1. Window not full → None (insufficient data, not an error)
//! 2. Static signal scoring over every observation in the window
//! 3. Trend scoring on newest-minus-oldest slopes
//! 4. Worsening := any trend tag present
//! 5. Stabilization decay (or record deterioration time)
//! 6. Clamp score at 0, map to level, set confidence
//! ```
//!
//! # Critical Invariants
//!
//! 1. **Non-negative score**: `signal_score` is clamped after decay
//! 2. **Chronological input**: observations for one patient must arrive in
//!    non-decreasing timestamp order; this is not checked
//! 3. **Independent patients**: windows and states never share data

use crate::core::time::minutes_between;
use crate::models::observation::Observation;
use crate::models::risk::{is_worsening, RiskState, SignalTag};
use crate::risk::scoring::{
    score_window, RiskThresholds, LONG_STABILITY_DECAY, SHORT_STABILITY_DECAY,
};
use crate::risk::window::PatientWindow;
use std::collections::HashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct PatientTrack {
    window: PatientWindow,
    state: RiskState,
}

/// Per-patient risk tracker
///
/// # Example
/// ```
/// use hospital_flow_core::{Observation, RiskAgent, RiskLevel};
/// use hospital_flow_core::core::time::parse_timestamp;
///
/// let mut agent = RiskAgent::new(3);
/// let rows = [
///     ("2024-03-01 08:00:00", 80.0),
///     ("2024-03-01 08:10:00", 95.0),
///     ("2024-03-01 08:20:00", 120.0),
/// ];
///
/// for (i, (ts, hr)) in rows.iter().enumerate() {
///     agent.observe(Observation::new("P1", parse_timestamp(ts).unwrap(), *hr, 120.0));
///     let state = agent.update("P1");
///     if i < 2 {
///         assert!(state.is_none()); // window not yet full
///     }
/// }
///
/// let state = agent.update("P1").unwrap();
/// // tachycardia on the last row (+1), heart rate slope 40 (+1)
/// assert_eq!(state.signal_score, 2);
/// assert_eq!(state.risk_level, RiskLevel::Moderate);
/// assert_eq!(state.confidence, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct RiskAgent {
    window_size: usize,
    thresholds: RiskThresholds,
    patients: HashMap<String, PatientTrack>,
}

impl RiskAgent {
    /// Create an agent with default clinical thresholds
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is zero.
    pub fn new(window_size: usize) -> Self {
        Self::with_thresholds(window_size, RiskThresholds::default())
    }

    pub fn with_thresholds(window_size: usize, thresholds: RiskThresholds) -> Self {
        assert!(window_size > 0, "window_size must be positive");
        Self {
            window_size,
            thresholds,
            patients: HashMap::new(),
        }
    }

    /// Record one observation for its patient
    ///
    /// Creates the patient's window and state on first sight. Evicts the
    /// oldest observation when the window is at capacity.
    pub fn observe(&mut self, observation: Observation) {
        let window_size = self.window_size;
        let track = self
            .patients
            .entry(observation.patient_id().to_string())
            .or_insert_with(|| PatientTrack {
                window: PatientWindow::new(window_size),
                state: RiskState::new(),
            });
        track.window.push(observation);
    }

    /// Recompute the patient's risk state
    ///
    /// Returns `None` while the window holds fewer than `window_size`
    /// observations, or if the patient has never been observed. Otherwise
    /// returns the patient's single state object, updated in place.
    pub fn update(&mut self, patient_id: &str) -> Option<&RiskState> {
        let thresholds = &self.thresholds;
        let track = self.patients.get_mut(patient_id)?;

        if !track.window.is_full() {
            trace!(
                patient_id,
                observed = track.window.len(),
                required = track.window.capacity(),
                "insufficient data for risk update"
            );
            return None;
        }

        let scored = score_window(&track.window, thresholds)?;
        let now = track.window.newest()?.timestamp();
        let mut score = scored.score;
        let mut reasons = scored.reasons;
        let state = &mut track.state;

        if is_worsening(&reasons) {
            if state.last_deterioration_time.is_none() {
                debug!(patient_id, at = %now, "deterioration detected");
            }
            state.last_deterioration_time = Some(now);
        } else if let Some(last_bad) = state.last_deterioration_time {
            let stable_minutes = minutes_between(last_bad, now);
            if stable_minutes >= thresholds.stable_long_minutes {
                score -= LONG_STABILITY_DECAY;
                reasons.insert(SignalTag::StableFor60Min);
            } else if stable_minutes >= thresholds.stable_short_minutes {
                score -= SHORT_STABILITY_DECAY;
                reasons.insert(SignalTag::StableFor30Min);
            }
            debug!(patient_id, stable_minutes, "stabilization decay evaluated");
        }

        let score = u32::try_from(score.max(0)).unwrap_or(u32::MAX);

        state.risk_level = thresholds.level_for(score);
        state.signal_score = score;
        state.confidence = track.window.fill_ratio();
        state.reasons = reasons;
        state.trends = scored.trends;

        Some(&track.state)
    }

    /// True if one more observation for this patient makes its window full
    pub fn fills_window_with_next(&self, patient_id: &str) -> bool {
        let observed = self.patients.get(patient_id).map_or(0, |track| track.window.len());
        observed + 1 >= self.window_size
    }

    /// Current state of a patient without recomputing it
    pub fn state(&self, patient_id: &str) -> Option<&RiskState> {
        self.patients.get(patient_id).map(|track| &track.state)
    }

    pub fn window(&self, patient_id: &str) -> Option<&PatientWindow> {
        self.patients.get(patient_id).map(|track| &track.window)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Number of patients seen so far
    pub fn num_patients(&self) -> usize {
        self.patients.len()
    }
}
