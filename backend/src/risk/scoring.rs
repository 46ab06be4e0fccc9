//! Signal scoring rules
//!
//! Static thresholds are applied to every observation in the window, so a
//! sign that persists across the window counts once per observation. Trend
//! thresholds are applied once, to the newest-minus-oldest slope.
//!
//! | tag                      | condition               | points |
//! |--------------------------|-------------------------|--------|
//! | `tachycardia`            | heart_rate > 100        | 1      |
//! | `hypotension`            | sbp < 100               | 1      |
//! | `elevated_troponin`      | troponin > 0.04         | 2      |
//! | `elevated_ck_mb`         | ck_mb > 5               | 1      |
//! | `worsening_heart_rate`   | hr_slope > 10           | 1      |
//! | `falling_blood_pressure` | sbp_slope < -15         | 1      |
//! | `rising_troponin_trend`  | troponin_slope > 0.02   | 1      |
//! | `rising_ck_mb_trend`     | ck_mb_slope > 1         | 1      |
//!
//! Threshold values come from [`RiskThresholds`]; the point weights are fixed.

use crate::models::observation::Observation;
use crate::models::risk::{RiskLevel, SignalTag, Trends};
use crate::risk::window::PatientWindow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const TROPONIN_POINTS: i64 = 2;

/// Decay applied after `stable_long_minutes` without deterioration
pub const LONG_STABILITY_DECAY: i64 = 2;

/// Decay applied after `stable_short_minutes` without deterioration
pub const SHORT_STABILITY_DECAY: i64 = 1;

/// Static clinical thresholds used by the risk agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Heart rate above this is tachycardia (bpm)
    pub tachycardia_hr: f64,

    /// Systolic pressure below this is hypotension (mmHg)
    pub hypotension_sbp: f64,

    /// Troponin above this is elevated (ng/mL)
    pub troponin: f64,

    /// CK-MB above this is elevated (ng/mL)
    pub ck_mb: f64,

    pub hr_slope: f64,

    /// Negative: a drop larger than this magnitude fires
    pub sbp_slope: f64,

    pub troponin_slope: f64,

    pub ck_mb_slope: f64,

    pub critical_score: u32,

    pub high_score: u32,

    pub moderate_score: u32,

    pub stable_short_minutes: f64,

    pub stable_long_minutes: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            tachycardia_hr: 100.0,
            hypotension_sbp: 100.0,
            troponin: 0.04,
            ck_mb: 5.0,
            hr_slope: 10.0,
            sbp_slope: -15.0,
            troponin_slope: 0.02,
            ck_mb_slope: 1.0,
            critical_score: 6,
            high_score: 4,
            moderate_score: 2,
            stable_short_minutes: 30.0,
            stable_long_minutes: 60.0,
        }
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("tachycardia_hr", self.tachycardia_hr),
            ("hypotension_sbp", self.hypotension_sbp),
            ("troponin", self.troponin),
            ("ck_mb", self.ck_mb),
            ("hr_slope", self.hr_slope),
            ("sbp_slope", self.sbp_slope),
            ("troponin_slope", self.troponin_slope),
            ("ck_mb_slope", self.ck_mb_slope),
            ("stable_short_minutes", self.stable_short_minutes),
            ("stable_long_minutes", self.stable_long_minutes),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(format!("risk threshold '{}' must be finite", name));
            }
        }
        if !(self.critical_score >= self.high_score && self.high_score >= self.moderate_score) {
            return Err(format!(
                "score bands must satisfy critical >= high >= moderate (got {} / {} / {})",
                self.critical_score, self.high_score, self.moderate_score
            ));
        }
        if self.stable_short_minutes > self.stable_long_minutes {
            return Err(format!(
                "stable_short_minutes {} exceeds stable_long_minutes {}",
                self.stable_short_minutes, self.stable_long_minutes
            ));
        }
        Ok(())
    }

    /// Map a post-decay score to a level, highest band first
    pub fn level_for(&self, score: u32) -> RiskLevel {
        if score >= self.critical_score {
            RiskLevel::Critical
        } else if score >= self.high_score {
            RiskLevel::High
        } else if score >= self.moderate_score {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// Raw score and deduplicated tags before stabilization decay
#[derive(Debug, Clone, PartialEq)]
pub struct SignalScore {
    pub score: i64,
    pub reasons: BTreeSet<SignalTag>,
    pub trends: Trends,
}

fn score_observation(
    obs: &Observation,
    thresholds: &RiskThresholds,
    reasons: &mut BTreeSet<SignalTag>,
) -> i64 {
    let mut score = 0;
    if obs.heart_rate() > thresholds.tachycardia_hr {
        score += 1;
        reasons.insert(SignalTag::Tachycardia);
    }
    if obs.sbp() < thresholds.hypotension_sbp {
        score += 1;
        reasons.insert(SignalTag::Hypotension);
    }
    if obs.troponin() > thresholds.troponin {
        score += TROPONIN_POINTS;
        reasons.insert(SignalTag::ElevatedTroponin);
    }
    if obs.ck_mb() > thresholds.ck_mb {
        score += 1;
        reasons.insert(SignalTag::ElevatedCkMb);
    }
    score
}

/// Newest-minus-oldest slopes
pub fn compute_trends(oldest: &Observation, newest: &Observation) -> Trends {
    Trends {
        hr_slope: newest.heart_rate() - oldest.heart_rate(),
        sbp_slope: newest.sbp() - oldest.sbp(),
        troponin_slope: newest.troponin() - oldest.troponin(),
        ck_mb_slope: newest.ck_mb() - oldest.ck_mb(),
    }
}

fn score_trends(trends: &Trends, thresholds: &RiskThresholds, reasons: &mut BTreeSet<SignalTag>) -> i64 {
    let checks = [
        (trends.hr_slope > thresholds.hr_slope, SignalTag::WorseningHeartRate),
        (trends.sbp_slope < thresholds.sbp_slope, SignalTag::FallingBloodPressure),
        (trends.troponin_slope > thresholds.troponin_slope, SignalTag::RisingTroponinTrend),
        (trends.ck_mb_slope > thresholds.ck_mb_slope, SignalTag::RisingCkMbTrend),
    ];

    let mut score = 0;
    for (fired, tag) in checks {
        if fired {
            score += 1;
            reasons.insert(tag);
        }
    }
    score
}

/// Score a window: static signals on every observation plus trend signals
///
/// Returns `None` for an empty window.
pub fn score_window(window: &PatientWindow, thresholds: &RiskThresholds) -> Option<SignalScore> {
    let oldest = window.oldest()?;
    let newest = window.newest()?;

    let mut reasons = BTreeSet::new();
    let mut score: i64 = window
        .iter()
        .map(|obs| score_observation(obs, thresholds, &mut reasons))
        .sum();

    let trends = compute_trends(oldest, newest);
    score += score_trends(&trends, thresholds, &mut reasons);

    Some(SignalScore {
        score,
        reasons,
        trends,
    })
}
