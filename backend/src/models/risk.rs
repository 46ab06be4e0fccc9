//! Risk state model
//!
//! The per-patient clinical risk picture maintained by the
//! [`RiskAgent`](crate::risk::RiskAgent): level, score, confidence, the signal
//! tags that produced the score, and the window trend slopes.
//!
//! Signal tags are a closed set. Four of them are *trend* tags; the presence
//! of any trend tag marks the patient as worsening, both for stabilization
//! decay and for the decision engine.

use crate::core::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Risk classification, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason tag attached to a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalTag {
    // Static thresholds, checked on every observation in the window
    Tachycardia,
    Hypotension,
    ElevatedTroponin,
    ElevatedCkMb,

    // Window trends
    WorseningHeartRate,
    FallingBloodPressure,
    RisingTroponinTrend,
    RisingCkMbTrend,

    // Stabilization decay
    #[serde(rename = "stable_for_30_min")]
    StableFor30Min,
    #[serde(rename = "stable_for_60_min")]
    StableFor60Min,
}

impl SignalTag {
    /// Tags whose presence means the patient is deteriorating
    pub const TREND_TAGS: [SignalTag; 4] = [
        SignalTag::WorseningHeartRate,
        SignalTag::FallingBloodPressure,
        SignalTag::RisingTroponinTrend,
        SignalTag::RisingCkMbTrend,
    ];

    pub fn is_trend(&self) -> bool {
        Self::TREND_TAGS.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalTag::Tachycardia => "tachycardia",
            SignalTag::Hypotension => "hypotension",
            SignalTag::ElevatedTroponin => "elevated_troponin",
            SignalTag::ElevatedCkMb => "elevated_ck_mb",
            SignalTag::WorseningHeartRate => "worsening_heart_rate",
            SignalTag::FallingBloodPressure => "falling_blood_pressure",
            SignalTag::RisingTroponinTrend => "rising_troponin_trend",
            SignalTag::RisingCkMbTrend => "rising_ck_mb_trend",
            SignalTag::StableFor30Min => "stable_for_30_min",
            SignalTag::StableFor60Min => "stable_for_60_min",
        }
    }
}

impl fmt::Display for SignalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if any trend tag is present
pub fn is_worsening(reasons: &BTreeSet<SignalTag>) -> bool {
    reasons.iter().any(SignalTag::is_trend)
}

/// Slopes across a full window (newest value minus oldest value)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub hr_slope: f64,
    pub sbp_slope: f64,
    pub troponin_slope: f64,
    pub ck_mb_slope: f64,
}

/// Per-patient risk state, updated in place on every full-window update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskState {
    pub risk_level: RiskLevel,

    /// Accumulated signal score after decay, never below 0
    pub signal_score: u32,

    /// Window fill ratio in [0, 1]
    pub confidence: f64,

    pub reasons: BTreeSet<SignalTag>,

    pub trends: Trends,

    /// Newest observation time at which a trend tag last fired
    pub last_deterioration_time: Option<Timestamp>,
}

impl RiskState {
    /// State of a patient seen but not yet scored
    pub fn new() -> Self {
        Self {
            risk_level: RiskLevel::Low,
            signal_score: 0,
            confidence: 0.0,
            reasons: BTreeSet::new(),
            trends: Trends::default(),
            last_deterioration_time: None,
        }
    }

    pub fn is_worsening(&self) -> bool {
        is_worsening(&self.reasons)
    }

    pub fn has_reason(&self, tag: SignalTag) -> bool {
        self.reasons.contains(&tag)
    }
}

impl Default for RiskState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_trend_tags_mark_worsening() {
        let mut reasons: BTreeSet<SignalTag> = [
            SignalTag::Tachycardia,
            SignalTag::ElevatedTroponin,
            SignalTag::StableFor60Min,
        ]
        .into_iter()
        .collect();
        assert!(!is_worsening(&reasons));

        reasons.insert(SignalTag::RisingCkMbTrend);
        assert!(is_worsening(&reasons));
    }

    #[test]
    fn test_tag_serializes_as_snake_case() {
        let json = serde_json::to_string(&SignalTag::StableFor60Min).unwrap();
        assert_eq!(json, "\"stable_for_60_min\"");
        let json = serde_json::to_string(&SignalTag::ElevatedCkMb).unwrap();
        assert_eq!(json, "\"elevated_ck_mb\"");
    }

    #[test]
    fn test_level_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Moderate);
        assert!(RiskLevel::Moderate > RiskLevel::Low);
        assert_eq!(serde_json::to_string(&RiskLevel::Moderate).unwrap(), "\"MODERATE\"");
    }
}
