//! Decision Policy Module
//!
//! Maps a patient's risk state and the hospital's resource state to one
//! [`Action`] with an explanation.
//!
//! # Rule cascade
//!
//! Evaluated top to bottom, first match wins:
//!
//! ```text
//! 1. pressure >= 0.90                 → BLOCK      (overrides every risk level)
//! 2. CRITICAL, ICU full               → ESCALATE
//!    CRITICAL                         → PRIORITIZE
//! 3. HIGH, worsening, confidence>=0.8 → PRIORITIZE
//!    HIGH, pressure >= 0.75           → DELAY
//!    HIGH                             → ALLOW
//! 4. MODERATE, worsening              → OBSERVE
//!    MODERATE                         → ALLOW
//! 5. LOW                              → OBSERVE
//! ```
//!
//! "Worsening" is read from the risk state's reason tags, not from any
//! risk-agent internals.
//!
//! # Policy Interface
//!
//! The simulation runner talks to a [`DecisionPolicy`]. [`DecisionEngine`] is
//! the production rule cascade:
//!
//! ```rust
//! use hospital_flow_core::policy::{DecisionEngine, DecisionPolicy};
//! use hospital_flow_core::{Action, ResourceState, RiskLevel, RiskState};
//!
//! let mut risk = RiskState::new();
//! risk.risk_level = RiskLevel::Low;
//!
//! let engine = DecisionEngine::default();
//! let decision = engine.decide(&risk, &ResourceState::with_pressure(0.95, false));
//! assert_eq!(decision.action, Action::Block);
//! assert_eq!(decision.reason, "Hospital at critical capacity");
//! ```

use crate::models::decision::{Action, Decision};
use crate::models::resource::ResourceState;
use crate::models::risk::{RiskLevel, RiskState};
use serde::{Deserialize, Serialize};

pub const REASON_CRITICAL_CAPACITY: &str = "Hospital at critical capacity";
pub const REASON_CRITICAL_NO_ICU: &str = "Critical risk but ICU unavailable";
pub const REASON_CRITICAL_PRIORITIZED: &str = "Critical patient prioritized";
pub const REASON_HIGH_WORSENING: &str = "High risk with worsening trends";
pub const REASON_HIGH_OVERLOADED: &str = "High risk but system overloaded";
pub const REASON_HIGH_AVAILABLE: &str = "High risk, resources available";
pub const REASON_MODERATE_DETERIORATING: &str = "Moderate risk with early deterioration";
pub const REASON_MODERATE_STABLE: &str = "Moderate risk stable";
pub const REASON_LOW_STABLE: &str = "Risk stable";

/// Anything that can turn risk + resources into a decision
///
/// Implementations must be pure: identical inputs give identical output.
pub trait DecisionPolicy: Send + Sync {
    fn decide(&self, risk: &RiskState, resources: &ResourceState) -> Decision;
}

/// Cut-offs used by the rule cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    /// Pressure at or above which every admission is blocked
    pub block_pressure: f64,

    /// Pressure at or above which HIGH-risk admissions are delayed
    pub overload_pressure: f64,

    /// Minimum confidence for worsening HIGH-risk patients to be prioritized
    pub min_confidence: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            block_pressure: 0.90,
            overload_pressure: 0.75,
            min_confidence: 0.8,
        }
    }
}

impl DecisionThresholds {
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("block_pressure", self.block_pressure),
            ("overload_pressure", self.overload_pressure),
            ("min_confidence", self.min_confidence),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(format!("decision threshold '{}' must be finite", name));
            }
        }
        if self.overload_pressure > self.block_pressure {
            return Err(format!(
                "overload_pressure {} exceeds block_pressure {}",
                self.overload_pressure, self.block_pressure
            ));
        }
        Ok(())
    }
}

/// Stateless priority-ordered rule cascade
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionEngine {
    thresholds: DecisionThresholds,
}

impl DecisionEngine {
    pub fn new(thresholds: DecisionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &DecisionThresholds {
        &self.thresholds
    }
}

impl DecisionPolicy for DecisionEngine {
    fn decide(&self, risk: &RiskState, resources: &ResourceState) -> Decision {
        let t = &self.thresholds;
        let pressure = resources.pressure;
        let worsening = risk.is_worsening();

        // Hard capacity constraint
        if pressure >= t.block_pressure {
            return Decision::new(Action::Block, REASON_CRITICAL_CAPACITY);
        }

        match risk.risk_level {
            RiskLevel::Critical => {
                if resources.icu_full {
                    Decision::new(Action::Escalate, REASON_CRITICAL_NO_ICU)
                } else {
                    Decision::new(Action::Prioritize, REASON_CRITICAL_PRIORITIZED)
                }
            }
            RiskLevel::High => {
                if worsening && risk.confidence >= t.min_confidence {
                    Decision::new(Action::Prioritize, REASON_HIGH_WORSENING)
                } else if pressure >= t.overload_pressure {
                    Decision::new(Action::Delay, REASON_HIGH_OVERLOADED)
                } else {
                    Decision::new(Action::Allow, REASON_HIGH_AVAILABLE)
                }
            }
            RiskLevel::Moderate => {
                if worsening {
                    Decision::new(Action::Observe, REASON_MODERATE_DETERIORATING)
                } else {
                    Decision::new(Action::Allow, REASON_MODERATE_STABLE)
                }
            }
            RiskLevel::Low => Decision::new(Action::Observe, REASON_LOW_STABLE),
        }
    }
}

/// Evaluate the rule cascade with default thresholds
pub fn decide(risk: &RiskState, resources: &ResourceState) -> Decision {
    DecisionEngine::default().decide(risk, resources)
}
