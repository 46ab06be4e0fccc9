//! Property-based tests for scoring, pressure and the decision cascade

use hospital_flow_core::core::time::parse_timestamp;
use hospital_flow_core::{
    compute_pressure, decide, Action, HospitalCapacity, Observation, ResourceSnapshot,
    ResourceState, RiskAgent, RiskLevel, RiskState, SignalTag,
};
use proptest::prelude::*;

fn vitals() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (40.0f64..180.0, 60.0f64..180.0, 0.0f64..0.2, 0.0f64..15.0)
}

fn risk_level() -> impl Strategy<Value = RiskLevel> {
    prop_oneof![
        Just(RiskLevel::Low),
        Just(RiskLevel::Moderate),
        Just(RiskLevel::High),
        Just(RiskLevel::Critical),
    ]
}

/// Score of a single full-window update over `rows`, no prior history
fn window_score(rows: &[(f64, f64, f64, f64)]) -> u32 {
    let mut agent = RiskAgent::new(rows.len());
    let t0 = parse_timestamp("2024-03-01 00:00:00").unwrap();
    for (i, &(hr, sbp, trop, ck)) in rows.iter().enumerate() {
        let ts = t0 + chrono::Duration::minutes(10 * i as i64);
        agent.observe(Observation::new("P1", ts, hr, sbp).with_troponin(trop).with_ck_mb(ck));
    }
    agent.update("P1").map_or(0, |state| state.signal_score)
}

fn feed(agent: &mut RiskAgent, rows: &[(f64, f64, f64, f64)], gap_minutes: i64) -> Vec<Option<RiskState>> {
    let t0 = parse_timestamp("2024-03-01 00:00:00").unwrap();
    rows.iter()
        .enumerate()
        .map(|(i, &(hr, sbp, trop, ck))| {
            let ts = t0 + chrono::Duration::minutes(gap_minutes * i as i64);
            agent.observe(Observation::new("P1", ts, hr, sbp).with_troponin(trop).with_ck_mb(ck));
            agent.update("P1").cloned()
        })
        .collect()
}

proptest! {
    #[test]
    fn score_is_non_negative_and_level_matches(
        rows in prop::collection::vec(vitals(), 1..20),
        window in 1usize..6,
        gap in 1i64..90,
    ) {
        let mut agent = RiskAgent::new(window);
        for state in feed(&mut agent, &rows, gap).into_iter().flatten() {
            let thresholds = agent.thresholds();
            prop_assert_eq!(state.risk_level, thresholds.level_for(state.signal_score));
            prop_assert!((0.0..=1.0).contains(&state.confidence));
        }
    }

    #[test]
    fn no_state_until_window_full(
        rows in prop::collection::vec(vitals(), 1..12),
        window in 1usize..8,
    ) {
        let mut agent = RiskAgent::new(window);
        let states = feed(&mut agent, &rows, 5);
        for (i, state) in states.iter().enumerate() {
            prop_assert_eq!(state.is_some(), i + 1 >= window);
        }
    }

    #[test]
    fn pressure_is_bounded_and_rounded(
        icu_total in 1u32..50,
        ward_total in 1u32..500,
        icu_frac in 0.0f64..=1.0,
        ward_frac in 0.0f64..=1.0,
        staff_load in 0.0f64..3.0,
        er_queue in 0u32..100,
    ) {
        let capacity = HospitalCapacity::new("H1", icu_total, ward_total);
        let snapshot = ResourceSnapshot {
            hospital_id: "H1".to_string(),
            timestamp: parse_timestamp("2024-03-01 08:00:00").unwrap(),
            icu_beds_occupied: (f64::from(icu_total) * icu_frac) as u32,
            ward_beds_occupied: (f64::from(ward_total) * ward_frac) as u32,
            staff_load,
            er_queue_length: er_queue,
        };
        prop_assert!(snapshot.validate(&capacity).is_ok());

        let pressure = compute_pressure(&snapshot, &capacity);
        prop_assert!((0.0..=1.0).contains(&pressure));
        prop_assert!(((pressure * 100.0).round() - pressure * 100.0).abs() < 1e-6);
    }

    #[test]
    fn pressure_monotone_in_icu_occupancy(
        icu_total in 2u32..50,
        occupied in 0u32..49,
        staff_load in 0.0f64..1.0,
    ) {
        let occupied = occupied.min(icu_total - 1);
        let capacity = HospitalCapacity::new("H1", icu_total, 100);
        let snapshot = |icu| ResourceSnapshot {
            hospital_id: "H1".to_string(),
            timestamp: parse_timestamp("2024-03-01 08:00:00").unwrap(),
            icu_beds_occupied: icu,
            ward_beds_occupied: 50,
            staff_load,
            er_queue_length: 5,
        };
        let lower = compute_pressure(&snapshot(occupied), &capacity);
        let higher = compute_pressure(&snapshot(occupied + 1), &capacity);
        prop_assert!(higher >= lower);
    }

    #[test]
    fn block_overrides_every_risk_state(
        level in risk_level(),
        confidence in 0.0f64..=1.0,
        worsening in any::<bool>(),
        icu_full in any::<bool>(),
        pressure in 0.90f64..=1.0,
    ) {
        let mut risk = RiskState::new();
        risk.risk_level = level;
        risk.confidence = confidence;
        if worsening {
            risk.reasons.insert(SignalTag::WorseningHeartRate);
        }
        let decision = decide(&risk, &ResourceState::with_pressure(pressure, icu_full));
        prop_assert_eq!(decision.action, Action::Block);
    }

    #[test]
    fn below_block_never_blocks(
        level in risk_level(),
        confidence in 0.0f64..=1.0,
        icu_full in any::<bool>(),
        pressure in 0.0f64..0.89,
    ) {
        let mut risk = RiskState::new();
        risk.risk_level = level;
        risk.confidence = confidence;
        let decision = decide(&risk, &ResourceState::with_pressure(pressure, icu_full));
        prop_assert_ne!(decision.action, Action::Block);
        prop_assert!(!decision.reason.is_empty());
        if decision.action == Action::Escalate {
            prop_assert_eq!(level, RiskLevel::Critical);
            prop_assert!(icu_full);
        }
    }

    #[test]
    fn same_input_same_states(
        rows in prop::collection::vec(vitals(), 1..15),
        window in 1usize..5,
    ) {
        let mut a = RiskAgent::new(window);
        let mut b = RiskAgent::new(window);
        prop_assert_eq!(feed(&mut a, &rows, 20), feed(&mut b, &rows, 20));
    }

    #[test]
    fn raising_heart_rate_never_lowers_score(
        rows in prop::collection::vec(vitals(), 1..6),
        bump in 0.0f64..80.0,
    ) {
        let raised: Vec<_> = rows.iter().map(|&(hr, sbp, t, c)| (hr + bump, sbp, t, c)).collect();
        prop_assert!(window_score(&raised) >= window_score(&rows));
    }

    #[test]
    fn lowering_blood_pressure_never_lowers_score(
        rows in prop::collection::vec(vitals(), 1..6),
        fall in 0.0f64..60.0,
    ) {
        let lowered: Vec<_> = rows.iter().map(|&(hr, sbp, t, c)| (hr, sbp - fall, t, c)).collect();
        prop_assert!(window_score(&lowered) >= window_score(&rows));
    }

    #[test]
    fn raising_troponin_never_lowers_score(
        rows in prop::collection::vec(vitals(), 1..6),
        bump in 0.0f64..0.5,
    ) {
        let raised: Vec<_> = rows.iter().map(|&(hr, sbp, t, c)| (hr, sbp, t + bump, c)).collect();
        prop_assert!(window_score(&raised) >= window_score(&rows));
    }

    #[test]
    fn raising_ck_mb_never_lowers_score(
        rows in prop::collection::vec(vitals(), 1..6),
        bump in 0.0f64..20.0,
    ) {
        let raised: Vec<_> = rows.iter().map(|&(hr, sbp, t, c)| (hr, sbp, t, c + bump)).collect();
        prop_assert!(window_score(&raised) >= window_score(&rows));
    }
}
