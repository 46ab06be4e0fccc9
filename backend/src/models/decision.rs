//! Decision output model
//!
//! The action set is closed. Each decision pairs an [`Action`] with a static
//! explanation string; a [`DecisionRecord`] adds the patient, time, risk and
//! pressure context and is what downstream consumers read.
//!
//! The `reason` of a record is always non-empty. It is the explanation of
//! record whenever an optional narration service is unavailable.

use crate::core::time::Timestamp;
use crate::models::risk::RiskLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recommended patient-flow action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Hospital at critical capacity, no admission
    Block,
    /// Critical patient but no ICU bed, escalate beyond the unit
    Escalate,
    /// Move ahead of the queue
    Prioritize,
    /// Admit through the normal path
    Allow,
    /// Hold until load drops
    Delay,
    /// Keep monitoring
    Observe,
}

impl Action {
    /// All actions in declaration order
    pub const ALL: [Action; 6] = [
        Action::Block,
        Action::Escalate,
        Action::Prioritize,
        Action::Allow,
        Action::Delay,
        Action::Observe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Block => "BLOCK",
            Action::Escalate => "ESCALATE",
            Action::Prioritize => "PRIORITIZE",
            Action::Allow => "ALLOW",
            Action::Delay => "DELAY",
            Action::Observe => "OBSERVE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one rule-cascade evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub reason: &'static str,
}

impl Decision {
    pub const fn new(action: Action, reason: &'static str) -> Self {
        Self { action, reason }
    }
}

/// One emitted decision, in output order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    #[serde(with = "crate::core::time::flexible")]
    pub timestamp: Timestamp,

    pub patient_id: String,

    pub risk_level: RiskLevel,

    pub signal_score: u32,

    pub action: Action,

    pub reason: String,

    pub pressure: f64,
}

impl DecisionRecord {
    /// Engine explanation, used verbatim when no narration is available
    pub fn explanation(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for DecisionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | Patient={} | Risk={} | Score={} | Decision={} | Why={}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.patient_id,
            self.risk_level,
            self.signal_score,
            self.action,
            self.reason
        )
    }
}
