//! Observation model
//!
//! One patient's vitals at one instant. Each observation has:
//! - Patient identifier
//! - Timestamp (wall clock, see [`crate::core::time`])
//! - Heart rate and systolic blood pressure (required)
//! - Troponin and CK-MB biomarkers (optional, default 0)
//! - ICU requirement flag (optional, default false)
//!
//! Raw rows arrive as [`ObservationInput`] with every field optional and are
//! validated into an immutable [`Observation`] at the boundary. Scoring code
//! never sees a missing vital.

use crate::core::time::{parse_timestamp, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a raw row cannot become an [`Observation`]
#[derive(Debug, Error, PartialEq)]
pub enum ObservationError {
    #[error("Malformed observation: missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("Malformed observation: invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Malformed observation: field '{field}' is not a finite number")]
    NonFinite { field: &'static str },
}

/// Raw observation row as supplied by an upstream feed
///
/// `systolic_bp` is accepted in place of `sbp`. When a row carries both,
/// `sbp` wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationInput {
    #[serde(default)]
    pub patient_id: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub heart_rate: Option<f64>,

    #[serde(default)]
    pub sbp: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<f64>,

    #[serde(default)]
    pub troponin: Option<f64>,

    #[serde(default)]
    pub ck_mb: Option<f64>,

    #[serde(default)]
    pub requires_icu: Option<bool>,
}

/// Validated patient observation
///
/// Deserialization goes through [`ObservationInput`], so the same checks
/// apply to JSON as to raw rows.
///
/// # Example
/// ```
/// use hospital_flow_core::Observation;
/// use hospital_flow_core::core::time::parse_timestamp;
///
/// let ts = parse_timestamp("2024-03-01 08:00:00").unwrap();
/// let obs = Observation::new("P0001", ts, 88.0, 124.0);
/// assert_eq!(obs.troponin(), 0.0);
/// assert_eq!(obs.ck_mb(), 0.0);
///
/// let obs = obs.with_troponin(0.05);
/// assert_eq!(obs.troponin(), 0.05);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObservationInput")]
pub struct Observation {
    patient_id: String,

    #[serde(with = "crate::core::time::flexible")]
    timestamp: Timestamp,

    heart_rate: f64,

    /// Systolic blood pressure (mmHg)
    sbp: f64,

    troponin: f64,

    ck_mb: f64,

    requires_icu: bool,
}

impl Observation {
    /// Create an observation with biomarkers absent (treated as 0)
    pub fn new(patient_id: impl Into<String>, timestamp: Timestamp, heart_rate: f64, sbp: f64) -> Self {
        Self {
            patient_id: patient_id.into(),
            timestamp,
            heart_rate,
            sbp,
            troponin: 0.0,
            ck_mb: 0.0,
            requires_icu: false,
        }
    }

    pub fn with_troponin(mut self, troponin: f64) -> Self {
        self.troponin = troponin;
        self
    }

    pub fn with_ck_mb(mut self, ck_mb: f64) -> Self {
        self.ck_mb = ck_mb;
        self
    }

    pub fn with_requires_icu(mut self, requires_icu: bool) -> Self {
        self.requires_icu = requires_icu;
        self
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn heart_rate(&self) -> f64 {
        self.heart_rate
    }

    pub fn sbp(&self) -> f64 {
        self.sbp
    }

    pub fn troponin(&self) -> f64 {
        self.troponin
    }

    pub fn ck_mb(&self) -> f64 {
        self.ck_mb
    }

    pub fn requires_icu(&self) -> bool {
        self.requires_icu
    }
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ObservationError> {
    value.ok_or(ObservationError::MissingField { field })
}

fn finite(value: f64, field: &'static str) -> Result<f64, ObservationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ObservationError::NonFinite { field })
    }
}

impl TryFrom<ObservationInput> for Observation {
    type Error = ObservationError;

    fn try_from(input: ObservationInput) -> Result<Self, Self::Error> {
        let patient_id = require(input.patient_id, "patient_id")?;
        if patient_id.trim().is_empty() {
            return Err(ObservationError::MissingField { field: "patient_id" });
        }

        let raw_ts = require(input.timestamp, "timestamp")?;
        let timestamp = parse_timestamp(&raw_ts).map_err(|e| ObservationError::InvalidTimestamp {
            value: raw_ts.clone(),
            reason: e.to_string(),
        })?;

        let heart_rate = finite(require(input.heart_rate, "heart_rate")?, "heart_rate")?;
        let sbp = finite(require(input.sbp.or(input.systolic_bp), "sbp")?, "sbp")?;
        let troponin = finite(input.troponin.unwrap_or(0.0), "troponin")?;
        let ck_mb = finite(input.ck_mb.unwrap_or(0.0), "ck_mb")?;

        Ok(Self {
            patient_id,
            timestamp,
            heart_rate,
            sbp,
            troponin,
            ck_mb,
            requires_icu: input.requires_icu.unwrap_or(false),
        })
    }
}
