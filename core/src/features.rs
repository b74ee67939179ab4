//! Feature builder: the numeric front half of every run.
//!
//! ORDER (fixed):
//!   1. Signal builders      (per record)
//!   2. Risk state           (full population)
//!   3. Amplification        (needs the risk state)
//!   4. Prioritization       (top-K by customer risk score)

use crate::{
    data_source::CustomerRecord,
    error::PipelineResult,
    prioritization::prioritize_customers,
    risk_state::RiskState,
    scoring::amplification_score,
    signals::{EngineeredSignals, SignalColumn},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Every customer, in source order.
    pub population:  Vec<EngineeredSignals>,
    pub risk_state:  RiskState,
    /// The top-K shortlist.
    pub prioritized: Vec<EngineeredSignals>,
}

/// Fails on an empty population: nothing downstream is defined without
/// a risk state.
pub fn build_features(records: &[CustomerRecord], top_k: usize) -> PipelineResult<FeatureSet> {
    let mut population: Vec<EngineeredSignals> =
        records.iter().map(EngineeredSignals::from_record).collect();

    let risk_state = RiskState::build(&population, &SignalColumn::RISK_COLUMNS)?;

    for signals in &mut population {
        signals.amplification_score = amplification_score(signals, &risk_state);
    }

    let prioritized = prioritize_customers(&population, top_k);

    log::debug!(
        "features: population={} prioritized={} columns={}",
        population.len(),
        prioritized.len(),
        risk_state.len(),
    );

    Ok(FeatureSet { population, risk_state, prioritized })
}
