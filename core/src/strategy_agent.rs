//! Strategy ranking: who needs attention today.
//!
//! A third scoring scheme, independent of the prioritizer and the
//! watchlist: each stress dimension as a proximity to its p90, capped,
//! then weighted. Unlike the action plan, every customer here gets its
//! own primary driver (argmax over the three proximities).

use crate::{
    agent::names,
    risk_state::RiskState,
    signals::{EngineeredSignals, SignalColumn},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};

pub const OPS_PRIORITY_WEIGHT:     f64 = 0.45;
pub const FINANCE_PRIORITY_WEIGHT: f64 = 0.35;
pub const CX_PRIORITY_WEIGHT:      f64 = 0.20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityEntry {
    pub customer_id:       CustomerId,
    pub priority_score:    f64,
    pub primary_driver:    String,
    pub ops_proximity:     f64,
    pub finance_proximity: f64,
    pub cx_proximity:      f64,
    pub ops_stress:        f64,
    pub financial_stress:  f64,
    pub cx_stress:         f64,
}

/// value / p90, capped at `cap`. A zero p90 yields the cap for a
/// positive value and 0 otherwise.
pub fn proximity(value: f64, p90: f64, cap: f64) -> f64 {
    let ratio = value / p90;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.min(cap)
    }
}

pub fn score_customer(row: &EngineeredSignals, risk_state: &RiskState, cap: f64) -> PriorityEntry {
    let prox = |column: SignalColumn| {
        let p90 = risk_state.get(column).map(|s| s.p90).unwrap_or(0.0);
        proximity(row.value(column), p90, cap)
    };

    let ops_proximity = prox(SignalColumn::OpsStress);
    let finance_proximity = prox(SignalColumn::FinancialStress);
    let cx_proximity = prox(SignalColumn::CxStress);

    // Ties resolve to the earlier entry.
    let candidates = [
        (names::OPERATIONS, ops_proximity),
        (names::FINANCE, finance_proximity),
        (names::CX, cx_proximity),
    ];
    let mut primary_driver = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.1 > primary_driver.1 {
            primary_driver = *candidate;
        }
    }

    PriorityEntry {
        customer_id: row.customer_id.clone(),
        priority_score: OPS_PRIORITY_WEIGHT * ops_proximity
            + FINANCE_PRIORITY_WEIGHT * finance_proximity
            + CX_PRIORITY_WEIGHT * cx_proximity,
        primary_driver: primary_driver.0.to_string(),
        ops_proximity,
        finance_proximity,
        cx_proximity,
        ops_stress: row.ops_stress,
        financial_stress: row.financial_stress,
        cx_stress: row.cx_stress,
    }
}

/// Top `top_n` of the full population by priority score. Stable on ties.
pub fn rank_priorities(
    population: &[EngineeredSignals],
    risk_state: &RiskState,
    top_n: usize,
    cap: f64,
) -> Vec<PriorityEntry> {
    let mut ranked: Vec<PriorityEntry> = population
        .iter()
        .map(|row| score_customer(row, risk_state, cap))
        .collect();
    ranked.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    ranked.truncate(top_n);
    ranked
}
