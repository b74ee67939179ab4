//! Signal builders, the customer risk score and feature engineering.

use opsrisk_core::{
    data_source::CustomerRecord,
    error::PipelineError,
    features::build_features,
    scoring::customer_risk_score,
    signals::{EngineeredSignals, SignalColumn},
    synthetic::SyntheticPopulation,
};

fn record(id: &str, monthly: f64, peak: f64, outage: f64, bill: f64, delay: f64, tickets: f64) -> CustomerRecord {
    CustomerRecord {
        customer_id:        id.into(),
        monthly_usage_kwh:  monthly,
        peak_usage_kwh:     peak,
        avg_outage_hours:   outage,
        last_bill_amount:   bill,
        payment_delay_days: delay,
        service_tickets:    tickets,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn signals_follow_the_documented_formulas() {
    let s = EngineeredSignals::from_record(&record("C-1", 100.0, 150.0, 5.0, 200.0, 15.0, 4.0));

    assert_eq!(s.usage_mean, 100.0);
    assert_eq!(s.usage_std, 50.0);
    assert!(close(s.usage_volatility, 0.5), "volatility {}", s.usage_volatility);
    assert_eq!(s.ops_stress, 5.0);
    // 200 × (1 + 15/30)
    assert!(close(s.financial_stress, 300.0));
    assert!(close(s.cx_stress, 2.0));
    assert_eq!(s.amplification_score, 0, "amplification needs the risk state");

    // 0.35×0.5 + 0.30×5 + 0.25×300/10000 + 0.10×2
    assert!(close(s.customer_risk_score, 1.8825), "score {}", s.customer_risk_score);
}

#[test]
fn peak_below_monthly_still_gives_positive_deviation() {
    let s = EngineeredSignals::from_record(&record("C-1", 200.0, 150.0, 0.0, 0.0, 0.0, 0.0));
    assert_eq!(s.usage_std, 50.0);
}

#[test]
fn zero_usage_does_not_divide_by_zero() {
    let s = EngineeredSignals::from_record(&record("C-1", 0.0, 0.0, 0.0, 10.0, 0.0, 2.0));
    assert_eq!(s.usage_volatility, 0.0);
    assert_eq!(s.cx_stress, 0.0);
    assert!(s.customer_risk_score.is_finite());
}

#[test]
fn risk_score_treats_nan_as_missing() {
    let with_nan = customer_risk_score(f64::NAN, 2.0, 0.0, 1.0);
    let without = customer_risk_score(0.0, 2.0, 0.0, 1.0);
    assert_eq!(with_nan, without);
}

#[test]
fn non_finite_risk_score_becomes_zero() {
    assert_eq!(customer_risk_score(f64::INFINITY, 1.0, 1.0, 1.0), 0.0);
    assert_eq!(customer_risk_score(1.0, f64::INFINITY, f64::NEG_INFINITY, 1.0), 0.0);
}

#[test]
fn features_fill_amplification_from_the_population() {
    let records = vec![
        record("C-1", 100.0, 100.0, 1.0, 100.0, 0.0, 0.0),
        record("C-2", 100.0, 100.0, 1.0, 100.0, 0.0, 0.0),
        record("C-3", 100.0, 100.0, 1.0, 100.0, 0.0, 0.0),
        // Far above everyone on outages and billing, and the only one with tickets.
        record("C-4", 100.0, 300.0, 40.0, 900.0, 60.0, 5.0),
    ];
    let features = build_features(&records, 10).expect("features");

    assert_eq!(features.population.len(), 4);
    assert_eq!(features.prioritized.len(), 4);
    assert_eq!(features.risk_state.len(), SignalColumn::RISK_COLUMNS.len());
    assert_eq!(features.prioritized[0].customer_id, "C-4");
    assert_eq!(features.prioritized[0].amplification_score, 3);
    for calm in &features.population[..3] {
        assert_eq!(calm.amplification_score, 0, "{} sits below every p75", calm.customer_id);
    }
}

#[test]
fn empty_population_is_an_error() {
    match build_features(&[], 10) {
        Err(PipelineError::EmptyPopulation) => {}
        other => panic!("expected EmptyPopulation, got {other:?}"),
    }
}

#[test]
fn synthetic_population_is_reproducible() {
    let a = SyntheticPopulation::new(7, 120).generate();
    let b = SyntheticPopulation::new(7, 120).generate();
    let c = SyntheticPopulation::new(8, 120).generate();

    assert_eq!(a, b, "same seed must give the same rows");
    assert_ne!(a, c, "different seeds should diverge");
    assert_eq!(a.len(), 120);
    assert_eq!(a[0].customer_id, "C-000000");
    assert!(a.iter().all(|r| r.peak_usage_kwh >= r.monthly_usage_kwh));
}
