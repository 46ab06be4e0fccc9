//! Risk agent integration tests
//!
//! Covers windowing, static and trend scoring, stabilization decay and
//! per-patient isolation.

use hospital_flow_core::core::time::parse_timestamp;
use hospital_flow_core::{Observation, RiskAgent, RiskLevel, RiskState, RiskThresholds, SignalTag};

fn at(hhmm: &str) -> hospital_flow_core::core::time::Timestamp {
    parse_timestamp(&format!("2024-03-01 {}:00", hhmm)).unwrap()
}

fn obs(patient: &str, hhmm: &str, hr: f64, sbp: f64) -> Observation {
    Observation::new(patient, at(hhmm), hr, sbp)
}

fn tags(state: &RiskState) -> Vec<SignalTag> {
    state.reasons.iter().copied().collect()
}

// ============================================================================
// Windowing
// ============================================================================

#[test]
fn test_insufficient_data_returns_none() {
    let mut agent = RiskAgent::new(5);
    for (i, minute) in ["08:00", "08:10", "08:20", "08:30"].iter().enumerate() {
        agent.observe(obs("P1", minute, 80.0 + i as f64, 120.0));
        assert!(agent.update("P1").is_none(), "window not full after {} rows", i + 1);
    }
    agent.observe(obs("P1", "08:40", 84.0, 120.0));
    assert!(agent.update("P1").is_some());
}

#[test]
fn test_unknown_patient_returns_none() {
    let mut agent = RiskAgent::new(1);
    assert!(agent.update("ghost").is_none());
    assert_eq!(agent.num_patients(), 0);
}

#[test]
fn test_window_evicts_oldest() {
    let mut agent = RiskAgent::new(3);
    for (minute, hr) in [("08:00", 70.0), ("08:10", 80.0), ("08:20", 90.0), ("08:30", 95.0)] {
        agent.observe(obs("P1", minute, hr, 120.0));
    }

    let window = agent.window("P1").unwrap();
    assert_eq!(window.len(), 3);
    assert_eq!(window.oldest().unwrap().heart_rate(), 80.0);
    assert_eq!(window.newest().unwrap().heart_rate(), 95.0);

    // slope uses the current window only: 95 - 80
    let state = agent.update("P1").unwrap();
    assert_eq!(state.trends.hr_slope, 15.0);
}

// ============================================================================
// Scoring
// ============================================================================

#[test]
fn test_rising_heart_rate_scenario() {
    let mut agent = RiskAgent::new(5);
    let rows = [("08:00", 80.0), ("08:10", 85.0), ("08:20", 90.0), ("08:30", 130.0), ("08:40", 140.0)];
    for (minute, hr) in rows {
        agent.observe(obs("P1", minute, hr, 120.0));
    }

    let state = agent.update("P1").unwrap();
    // two tachycardic rows (+2) and hr slope 60 (+1)
    assert_eq!(state.signal_score, 3);
    assert_eq!(state.risk_level, RiskLevel::Moderate);
    assert_eq!(state.trends.hr_slope, 60.0);
    assert_eq!(state.trends.sbp_slope, 0.0);
    assert_eq!(tags(state), vec![SignalTag::Tachycardia, SignalTag::WorseningHeartRate]);
    assert!(state.is_worsening());
    assert_eq!(state.confidence, 1.0);
    assert_eq!(state.last_deterioration_time, Some(at("08:40")));
}

#[test]
fn test_static_signals_count_per_observation() {
    let mut agent = RiskAgent::new(3);
    for minute in ["08:00", "08:10", "08:20"] {
        agent.observe(obs("P1", minute, 110.0, 95.0));
    }

    let state = agent.update("P1").unwrap();
    // tachycardia + hypotension on each of three rows, flat trends
    assert_eq!(state.signal_score, 6);
    assert_eq!(state.risk_level, RiskLevel::Critical);
    assert_eq!(tags(state), vec![SignalTag::Tachycardia, SignalTag::Hypotension]);
    assert!(!state.is_worsening());
}

#[test]
fn test_biomarker_signals() {
    let mut agent = RiskAgent::new(2);
    agent.observe(obs("P1", "08:00", 80.0, 120.0).with_troponin(0.01).with_ck_mb(2.0));
    agent.observe(obs("P1", "08:10", 80.0, 120.0).with_troponin(0.05).with_ck_mb(6.0));

    let state = agent.update("P1").unwrap();
    // elevated troponin (+2), elevated ck-mb (+1), both trends (+2)
    assert_eq!(state.signal_score, 5);
    assert_eq!(state.risk_level, RiskLevel::High);
    assert!(state.has_reason(SignalTag::ElevatedTroponin));
    assert!(state.has_reason(SignalTag::ElevatedCkMb));
    assert!(state.has_reason(SignalTag::RisingTroponinTrend));
    assert!(state.has_reason(SignalTag::RisingCkMbTrend));
}

#[test]
fn test_falling_blood_pressure_trend() {
    let mut agent = RiskAgent::new(2);
    agent.observe(obs("P1", "08:00", 80.0, 130.0));
    agent.observe(obs("P1", "08:10", 80.0, 110.0));

    let state = agent.update("P1").unwrap();
    assert_eq!(state.trends.sbp_slope, -20.0);
    assert_eq!(tags(state), vec![SignalTag::FallingBloodPressure]);
    assert_eq!(state.signal_score, 1);
    assert_eq!(state.risk_level, RiskLevel::Low);
}

#[test]
fn test_thresholds_are_strict_inequalities() {
    let mut agent = RiskAgent::new(2);
    agent.observe(obs("P1", "08:00", 90.0, 115.0).with_troponin(0.04).with_ck_mb(5.0));
    agent.observe(obs("P1", "08:10", 100.0, 100.0).with_troponin(0.04).with_ck_mb(5.0));

    let state = agent.update("P1").unwrap();
    // hr 100 is not > 100, sbp 100 is not < 100, slope 10 is not > 10, etc.
    assert_eq!(state.signal_score, 0);
    assert!(state.reasons.is_empty());
}

#[test]
fn test_custom_thresholds() {
    let thresholds = RiskThresholds {
        tachycardia_hr: 90.0,
        ..Default::default()
    };
    let mut agent = RiskAgent::with_thresholds(2, thresholds);
    agent.observe(obs("P1", "08:00", 95.0, 120.0));
    agent.observe(obs("P1", "08:10", 95.0, 120.0));

    let state = agent.update("P1").unwrap();
    assert_eq!(state.signal_score, 2);
    assert_eq!(agent.thresholds().tachycardia_hr, 90.0);
}

// ============================================================================
// Stabilization decay
// ============================================================================

/// Window of two with troponin on every row: static score 4, so the
/// deterioration step (hr slope 15) scores 5.
fn deteriorated_agent() -> RiskAgent {
    let mut agent = RiskAgent::new(2);
    agent.observe(obs("P1", "08:00", 80.0, 120.0).with_troponin(0.05));
    agent.observe(obs("P1", "08:10", 95.0, 120.0).with_troponin(0.05));

    let state = agent.update("P1").unwrap();
    assert_eq!(state.signal_score, 5);
    assert_eq!(state.risk_level, RiskLevel::High);
    assert_eq!(state.last_deterioration_time, Some(at("08:10")));
    agent
}

#[test]
fn test_stable_for_60_min_decays_by_two() {
    let mut agent = deteriorated_agent();
    agent.observe(obs("P1", "09:11", 95.0, 120.0).with_troponin(0.05));

    let state = agent.update("P1").unwrap();
    assert_eq!(state.signal_score, 2);
    assert_eq!(state.risk_level, RiskLevel::Moderate);
    assert!(state.has_reason(SignalTag::StableFor60Min));
    assert!(!state.has_reason(SignalTag::StableFor30Min));
    assert!(!state.is_worsening());
}

#[test]
fn test_stable_for_30_min_decays_by_one() {
    let mut agent = deteriorated_agent();
    agent.observe(obs("P1", "08:45", 95.0, 120.0).with_troponin(0.05));

    let state = agent.update("P1").unwrap();
    assert_eq!(state.signal_score, 3);
    assert_eq!(state.risk_level, RiskLevel::Moderate);
    assert!(state.has_reason(SignalTag::StableFor30Min));
    assert!(!state.has_reason(SignalTag::StableFor60Min));
}

#[test]
fn test_no_decay_before_30_min() {
    let mut agent = deteriorated_agent();
    agent.observe(obs("P1", "08:30", 95.0, 120.0).with_troponin(0.05));

    let state = agent.update("P1").unwrap();
    assert_eq!(state.signal_score, 4);
    assert_eq!(state.risk_level, RiskLevel::High);
    assert!(!state.has_reason(SignalTag::StableFor30Min));
    // deterioration time is kept, not cleared, while stable
    assert_eq!(state.last_deterioration_time, Some(at("08:10")));
}

#[test]
fn test_no_decay_without_prior_deterioration() {
    let mut agent = RiskAgent::new(2);
    agent.observe(obs("P1", "08:00", 80.0, 120.0).with_troponin(0.05));
    agent.observe(obs("P1", "10:00", 80.0, 120.0).with_troponin(0.05));

    let state = agent.update("P1").unwrap();
    assert_eq!(state.signal_score, 4);
    assert!(state.last_deterioration_time.is_none());
    assert!(!state.has_reason(SignalTag::StableFor60Min));
}

#[test]
fn test_renewed_deterioration_resets_clock() {
    let mut agent = deteriorated_agent();
    // worsens again at 08:50
    agent.observe(obs("P1", "08:50", 110.0, 120.0).with_troponin(0.05));
    let state = agent.update("P1").unwrap();
    assert_eq!(state.last_deterioration_time, Some(at("08:50")));

    // 09:11 is only 21 minutes after the latest deterioration
    agent.observe(obs("P1", "09:11", 110.0, 120.0).with_troponin(0.05));
    let state = agent.update("P1").unwrap();
    assert!(!state.has_reason(SignalTag::StableFor30Min));
    assert!(!state.has_reason(SignalTag::StableFor60Min));
}

#[test]
fn test_decay_never_goes_below_zero() {
    let mut agent = RiskAgent::new(2);
    agent.observe(obs("P1", "08:00", 80.0, 120.0));
    agent.observe(obs("P1", "08:10", 95.0, 120.0));
    assert_eq!(agent.update("P1").unwrap().signal_score, 1);

    agent.observe(obs("P1", "09:20", 95.0, 120.0));
    let state = agent.update("P1").unwrap();
    assert_eq!(state.signal_score, 0);
    assert_eq!(state.risk_level, RiskLevel::Low);
    assert!(state.has_reason(SignalTag::StableFor60Min));
}

// ============================================================================
// State identity and isolation
// ============================================================================

#[test]
fn test_update_returns_same_state_object() {
    let mut agent = RiskAgent::new(1);
    agent.observe(obs("P1", "08:00", 80.0, 120.0));
    let first = agent.update("P1").unwrap() as *const RiskState;

    agent.observe(obs("P1", "08:10", 120.0, 120.0));
    let second = agent.update("P1").unwrap() as *const RiskState;

    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(second, agent.state("P1").unwrap()));
}

#[test]
fn test_patients_are_independent() {
    let mut agent = RiskAgent::new(2);
    agent.observe(obs("P1", "08:00", 80.0, 120.0));
    agent.observe(obs("P2", "08:00", 120.0, 90.0));
    agent.observe(obs("P1", "08:10", 82.0, 121.0));
    assert!(agent.update("P2").is_none());

    let p1 = agent.update("P1").unwrap();
    assert_eq!(p1.signal_score, 0);
    assert_eq!(p1.risk_level, RiskLevel::Low);

    agent.observe(obs("P2", "08:10", 125.0, 85.0));
    let p2 = agent.update("P2").unwrap();
    assert_eq!(p2.signal_score, 4);
    assert_eq!(p2.risk_level, RiskLevel::High);

    assert_eq!(agent.state("P1").unwrap().signal_score, 0);
    assert_eq!(agent.num_patients(), 2);
}

#[test]
fn test_fresh_state_defaults() {
    let mut agent = RiskAgent::new(3);
    agent.observe(obs("P1", "08:00", 80.0, 120.0));

    let state = agent.state("P1").unwrap();
    assert_eq!(state.risk_level, RiskLevel::Low);
    assert_eq!(state.signal_score, 0);
    assert_eq!(state.confidence, 0.0);
    assert!(state.reasons.is_empty());
}

#[test]
#[should_panic(expected = "window_size must be positive")]
fn test_zero_window_panics() {
    let _ = RiskAgent::new(0);
}
