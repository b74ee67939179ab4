//! Per-customer composite scores.
//!
//! Two scoring schemes live here and they are NOT interchangeable:
//!   - `customer_risk_score`: raw-magnitude weighted sum, drives the prioritizer.
//!   - `overall_risk_score`:  weighted sum of p75 ratios, drives the watchlist.

use crate::{
    risk_state::RiskState,
    signals::{EngineeredSignals, SignalColumn},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};

// ── Customer risk score (prioritizer) ────────────────────────────────────────

pub const VOLATILITY_WEIGHT: f64 = 0.35;
pub const OPS_WEIGHT:        f64 = 0.30;
pub const FINANCIAL_WEIGHT:  f64 = 0.25;
pub const CX_WEIGHT:         f64 = 0.10;
/// Bills are currency amounts; this brings them in line with the other terms.
pub const FINANCIAL_SCALE:   f64 = 10_000.0;

/// Missing (NaN) inputs contribute nothing; a non-finite result becomes 0.
pub fn customer_risk_score(
    usage_volatility: f64,
    ops_stress: f64,
    financial_stress: f64,
    cx_stress: f64,
) -> f64 {
    let score = VOLATILITY_WEIGHT * nan_to_zero(usage_volatility)
        + OPS_WEIGHT * nan_to_zero(ops_stress)
        + FINANCIAL_WEIGHT * nan_to_zero(financial_stress) / FINANCIAL_SCALE
        + CX_WEIGHT * nan_to_zero(cx_stress);

    if score.is_finite() { score } else { 0.0 }
}

fn nan_to_zero(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}

// ── Amplification ────────────────────────────────────────────────────────────

/// The stress dimensions that can amplify each other.
pub const STRESS_COLUMNS: [SignalColumn; 3] = [
    SignalColumn::OpsStress,
    SignalColumn::FinancialStress,
    SignalColumn::CxStress,
];

/// Count of stress dimensions strictly above their population p75. Range 0–3.
pub fn amplification_score(signals: &EngineeredSignals, risk_state: &RiskState) -> u8 {
    STRESS_COLUMNS
        .iter()
        .filter(|&&column| {
            risk_state
                .get(column)
                .is_some_and(|stats| signals.value(column) > stats.p75)
        })
        .count() as u8
}

// ── Watchlist (p75 ratio) ────────────────────────────────────────────────────

pub const WATCHLIST_OPS_WEIGHT: f64 = 0.40;
pub const WATCHLIST_FIN_WEIGHT: f64 = 0.35;
pub const WATCHLIST_CX_WEIGHT:  f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityScores {
    pub ops_risk_score:     f64,
    pub fin_risk_score:     f64,
    pub cx_risk_score:      f64,
    pub overall_risk_score: f64,
}

/// Each dimension as a multiple of its population p75.
/// A zero p75 makes the ratio non-finite; that dimension then scores 0.
pub fn proximity_scores(signals: &EngineeredSignals, risk_state: &RiskState) -> ProximityScores {
    let ratio = |column: SignalColumn| -> f64 {
        let p75 = risk_state.get(column).map(|s| s.p75).unwrap_or(0.0);
        let r = signals.value(column) / p75;
        if r.is_finite() { r } else { 0.0 }
    };

    let ops_risk_score = ratio(SignalColumn::OpsStress);
    let fin_risk_score = ratio(SignalColumn::FinancialStress);
    let cx_risk_score = ratio(SignalColumn::CxStress);

    ProximityScores {
        ops_risk_score,
        fin_risk_score,
        cx_risk_score,
        overall_risk_score: WATCHLIST_OPS_WEIGHT * ops_risk_score
            + WATCHLIST_FIN_WEIGHT * fin_risk_score
            + WATCHLIST_CX_WEIGHT * cx_risk_score,
    }
}

pub fn overall_risk_score(signals: &EngineeredSignals, risk_state: &RiskState) -> f64 {
    proximity_scores(signals, risk_state).overall_risk_score
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub customer_id:         CustomerId,
    pub overall_risk_score:  f64,
    pub ops_stress:          f64,
    pub financial_stress:    f64,
    pub cx_stress:           f64,
    pub amplification_score: u8,
}

/// Top `top_n` customers by `overall_risk_score`, descending. Ties keep row order.
pub fn build_watchlist(
    population: &[EngineeredSignals],
    risk_state: &RiskState,
    top_n: usize,
) -> Vec<WatchlistEntry> {
    let mut scored: Vec<WatchlistEntry> = population
        .iter()
        .map(|s| WatchlistEntry {
            customer_id:         s.customer_id.clone(),
            overall_risk_score:  overall_risk_score(s, risk_state),
            ops_stress:          s.ops_stress,
            financial_stress:    s.financial_stress,
            cx_stress:           s.cx_stress,
            amplification_score: s.amplification_score,
        })
        .collect();

    scored.sort_by(|a, b| b.overall_risk_score.total_cmp(&a.overall_risk_score));
    scored.truncate(top_n);
    scored
}
