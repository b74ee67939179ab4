//! Prioritizer: selects the working set every evaluator operates on.
//!
//! Population statistics come from the full set; severity judgments are
//! made over this shortlist only.

use crate::signals::EngineeredSignals;

pub const DEFAULT_TOP_K: usize = 10;

/// Sort by `customer_risk_score` descending and keep the first `top_k`.
/// The sort is stable, so ties keep their original row order.
pub fn prioritize_customers(population: &[EngineeredSignals], top_k: usize) -> Vec<EngineeredSignals> {
    let mut ranked: Vec<&EngineeredSignals> = population.iter().collect();
    ranked.sort_by(|a, b| b.customer_risk_score.total_cmp(&a.customer_risk_score));
    ranked.into_iter().take(top_k).cloned().collect()
}
