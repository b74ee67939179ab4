//! Per-customer explanations, risk levels and the run-wide driver.

use opsrisk_core::{
    action_agent::{explain_customer, ActionPlanner, PrimaryDriver, RiskLevel},
    agent::{DomainSeverities, Severity},
    risk_state::{RiskState, SignalStats},
    signals::{EngineeredSignals, SignalColumn},
};

fn stats(p75: f64, p90: f64) -> SignalStats {
    SignalStats { mean: p75 / 2.0, p75, p90, max: p90 * 2.0 }
}

/// Explanation thresholds: volatility p90 1.0, cx p90 100, ops p75 3, finance p90 1e6.
fn risk_state() -> RiskState {
    RiskState::from_stats([
        (SignalColumn::UsageVolatility, stats(0.5, 1.0)),
        (SignalColumn::OpsStress, stats(3.0, 6.0)),
        (SignalColumn::FinancialStress, stats(5e5, 1e6)),
        (SignalColumn::CxStress, stats(50.0, 100.0)),
    ])
}

fn quiet(id: &str, score: f64) -> EngineeredSignals {
    EngineeredSignals {
        customer_id:         id.into(),
        usage_mean:          100.0,
        usage_std:           10.0,
        usage_volatility:    0.1,
        ops_stress:          0.0,
        financial_stress:    0.0,
        cx_stress:           0.0,
        amplification_score: 0,
        customer_risk_score: score,
    }
}

fn planner() -> ActionPlanner {
    ActionPlanner::new(6.5)
}

#[test]
fn two_explanations_give_point_eight_and_critical() {
    let mut row = quiet("C-1", 7.0);
    row.usage_volatility = 2.0;
    row.ops_stress = 5.0;

    let rs = risk_state();
    let plan = planner().plan(&[row], Some(&rs), &DomainSeverities::default());

    assert_eq!(plan.actions.len(), 1);
    let entry = &plan.actions[0];
    assert_eq!(entry.explanation.len(), 2, "{:?}", entry.explanation);
    assert_eq!(entry.confidence, 0.8);
    assert_eq!(entry.risk_level, RiskLevel::Critical);
    assert_eq!(entry.risk_score, 7.0);
    assert_eq!(plan.confidence, 0.8);
}

#[test]
fn critical_starts_exactly_at_the_threshold() {
    assert_eq!(planner().risk_level(6.5), RiskLevel::Critical);
    assert_eq!(planner().risk_level(6.49), RiskLevel::High);
    assert_eq!(planner().risk_level(0.0), RiskLevel::High);
}

#[test]
fn every_explanation_can_fire_and_confidence_caps() {
    let mut row = quiet("C-1", 1.0);
    row.usage_volatility = 2.0;
    row.cx_stress = 200.0;
    row.ops_stress = 5.0;
    row.financial_stress = 2e6;
    row.amplification_score = 3;

    let rs = risk_state();
    let explanations = explain_customer(&row, &rs);
    assert_eq!(explanations.len(), 5, "{explanations:?}");
    assert!(explanations[0].contains("2.00"), "volatility is quoted: {}", explanations[0]);

    let plan = planner().plan(&[row], Some(&rs), &DomainSeverities::default());
    assert_eq!(plan.actions[0].confidence, 0.95);
}

#[test]
fn thresholds_are_inclusive() {
    let mut row = quiet("C-1", 1.0);
    row.usage_volatility = 1.0; // == p90
    row.ops_stress = 3.0; // == p75
    assert_eq!(explain_customer(&row, &risk_state()).len(), 2);

    row.amplification_score = 2;
    assert_eq!(explain_customer(&row, &risk_state()).len(), 3);
}

#[test]
fn plan_confidence_is_the_mean_of_entries() {
    let mut one = quiet("C-1", 1.0);
    one.ops_stress = 5.0; // 1 explanation → 0.7
    let mut three = quiet("C-2", 1.0);
    three.ops_stress = 5.0;
    three.usage_volatility = 2.0;
    three.cx_stress = 150.0; // 3 explanations → 0.9

    let rs = risk_state();
    let plan = planner().plan(&[one, three], Some(&rs), &DomainSeverities::default());
    assert_eq!(plan.actions[0].confidence, 0.7);
    assert_eq!(plan.actions[1].confidence, 0.9);
    assert_eq!(plan.confidence, 0.8);
}

#[test]
fn quiet_row_keeps_base_confidence() {
    let rs = risk_state();
    let plan = planner().plan(&[quiet("C-1", 0.1)], Some(&rs), &DomainSeverities::default());
    assert!(plan.actions[0].explanation.is_empty());
    assert_eq!(plan.actions[0].confidence, 0.6);
}

#[test]
fn empty_inputs_give_an_empty_plan() {
    let rs = risk_state();
    let plan = planner().plan(&[], Some(&rs), &DomainSeverities::default());
    assert!(!plan.has_actions());
    assert_eq!(plan.confidence, 0.0);

    let plan = planner().plan(&[quiet("C-1", 1.0)], None, &DomainSeverities::default());
    assert!(plan.actions.is_empty());
    assert_eq!(plan.confidence, 0.0);
}

#[test]
fn driver_precedence_is_cx_then_operations_then_finance() {
    let all_high = DomainSeverities {
        operations: Some(Severity::High),
        finance:    Some(Severity::High),
        cx:         Some(Severity::High),
    };
    assert_eq!(PrimaryDriver::select(&all_high), PrimaryDriver::Cx);

    let ops_and_fin = DomainSeverities { cx: Some(Severity::Medium), ..all_high };
    assert_eq!(PrimaryDriver::select(&ops_and_fin), PrimaryDriver::Operations);

    let fin_only = DomainSeverities {
        operations: Some(Severity::Low),
        finance:    Some(Severity::High),
        cx:         None,
    };
    assert_eq!(PrimaryDriver::select(&fin_only), PrimaryDriver::Finance);

    assert_eq!(PrimaryDriver::select(&DomainSeverities::default()), PrimaryDriver::Monitoring);
}

#[test]
fn one_driver_applies_to_every_row() {
    let severities = DomainSeverities {
        operations: Some(Severity::High),
        finance:    Some(Severity::Low),
        cx:         Some(Severity::Medium),
    };
    let rows = [quiet("C-1", 9.0), quiet("C-2", 1.0), quiet("C-3", 0.0)];
    let rs = risk_state();
    let plan = planner().plan(&rows, Some(&rs), &severities);

    assert_eq!(plan.actions.len(), 3);
    for entry in &plan.actions {
        assert_eq!(entry.primary_driver, PrimaryDriver::Operations);
        let teams: Vec<_> = entry.recommended_actions.iter().map(|a| a.team.as_str()).collect();
        assert_eq!(teams, ["Operations", "Engineering"]);
        assert_eq!(entry.recommended_actions[0].priority, "P0");
    }
}

#[test]
fn monitoring_recommends_observation_only() {
    let actions = PrimaryDriver::Monitoring.recommended_actions();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].priority, "P2");
    assert_eq!(actions[0].action, "Continue observation");
}
