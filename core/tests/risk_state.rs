//! Population statistics and the prioritized working set.

use opsrisk_core::{
    prioritization::prioritize_customers,
    risk_state::{RiskState, SignalStats},
    scoring::amplification_score,
    signals::{EngineeredSignals, SignalColumn},
    synthetic::SyntheticPopulation,
};

fn row(id: &str, ops: f64, score: f64) -> EngineeredSignals {
    EngineeredSignals {
        customer_id:         id.into(),
        usage_mean:          100.0,
        usage_std:           10.0,
        usage_volatility:    0.1,
        ops_stress:          ops,
        financial_stress:    0.0,
        cx_stress:           0.0,
        amplification_score: 0,
        customer_risk_score: score,
    }
}

#[test]
fn stats_use_linear_interpolation() {
    let population: Vec<_> = (1..=5).map(|i| row(&format!("C-{i}"), i as f64, 0.0)).collect();
    let rs = RiskState::build(&population, &[SignalColumn::OpsStress]).expect("risk state");

    let stats = rs.get(SignalColumn::OpsStress).expect("ops stats");
    assert_eq!(stats.mean, 3.0);
    assert_eq!(stats.p75, 4.0);
    assert!((stats.p90 - 4.6).abs() < 1e-12, "p90 was {}", stats.p90);
    assert_eq!(stats.max, 5.0);
    assert!(rs.get(SignalColumn::CxStress).is_none(), "only requested columns are summarized");
}

#[test]
fn quantiles_are_ordered_on_real_populations() {
    for seed in [1u64, 7, 42, 1_000] {
        let records = SyntheticPopulation::new(seed, 300).generate();
        let population: Vec<_> = records.iter().map(EngineeredSignals::from_record).collect();
        let rs = RiskState::build(&population, &SignalColumn::RISK_COLUMNS).expect("risk state");

        for (column, stats) in rs.iter() {
            assert!(
                stats.p75 <= stats.p90 && stats.p90 <= stats.max,
                "seed {seed} {column}: p75={} p90={} max={}",
                stats.p75, stats.p90, stats.max
            );
        }
    }
}

#[test]
fn amplification_counts_strictly_above_p75() {
    let stats = |p75: f64| SignalStats { mean: p75, p75, p90: p75 * 2.0, max: p75 * 3.0 };
    let rs = RiskState::from_stats([
        (SignalColumn::OpsStress, stats(2.0)),
        (SignalColumn::FinancialStress, stats(100.0)),
        (SignalColumn::CxStress, stats(1.0)),
    ]);

    let mut s = row("C-1", 2.0, 0.0);
    s.financial_stress = 100.0;
    s.cx_stress = 1.0;
    assert_eq!(amplification_score(&s, &rs), 0, "equal to p75 does not count");

    s.ops_stress = 2.5;
    s.cx_stress = 1.5;
    assert_eq!(amplification_score(&s, &rs), 2);

    s.financial_stress = 101.0;
    assert_eq!(amplification_score(&s, &rs), 3);
}

#[test]
fn prioritized_set_is_the_top_k_by_score() {
    let population: Vec<_> = [0.5, 3.0, 1.0, 9.0, 2.0, 7.0]
        .iter()
        .enumerate()
        .map(|(i, &score)| row(&format!("C-{i}"), 0.0, score))
        .collect();

    let top = prioritize_customers(&population, 3);
    let ids: Vec<_> = top.iter().map(|s| s.customer_id.as_str()).collect();
    assert_eq!(ids, ["C-3", "C-5", "C-1"]);

    // Every excluded row scores no higher than the last included one.
    let floor = top.last().map(|s| s.customer_risk_score).unwrap_or_default();
    assert!(population
        .iter()
        .filter(|s| !ids.contains(&s.customer_id.as_str()))
        .all(|s| s.customer_risk_score <= floor));
}

#[test]
fn prioritized_length_is_min_of_k_and_population() {
    let population: Vec<_> = (0..4).map(|i| row(&format!("C-{i}"), 0.0, i as f64)).collect();
    assert_eq!(prioritize_customers(&population, 10).len(), 4);
    assert_eq!(prioritize_customers(&population, 2).len(), 2);
    assert!(prioritize_customers(&[], 10).is_empty());
}

#[test]
fn ties_keep_row_order() {
    let population = vec![
        row("C-a", 0.0, 1.0),
        row("C-b", 0.0, 5.0),
        row("C-c", 0.0, 1.0),
        row("C-d", 0.0, 1.0),
    ];
    let ids: Vec<_> = prioritize_customers(&population, 3)
        .into_iter()
        .map(|s| s.customer_id)
        .collect();
    assert_eq!(ids, ["C-b", "C-a", "C-c"]);
}
