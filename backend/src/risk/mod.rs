//! Patient risk tracking
//!
//! - **window**: bounded FIFO of recent observations per patient
//! - **scoring**: static and trend signal rules, level bands
//! - **agent**: the stateful [`RiskAgent`] tying them together with
//!   stabilization decay

pub mod agent;
pub mod scoring;
pub mod window;

pub use agent::RiskAgent;
pub use scoring::{compute_trends, score_window, RiskThresholds, SignalScore};
pub use window::PatientWindow;
