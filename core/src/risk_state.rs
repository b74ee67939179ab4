//! Population risk state: the shared statistical reference frame.
//!
//! Built once per run over the FULL engineered population, before any
//! evaluator runs, and never mutated afterwards.

use crate::{
    error::{PipelineError, PipelineResult},
    signals::{EngineeredSignals, SignalColumn},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub mean: f64,
    pub p75:  f64,
    pub p90:  f64,
    pub max:  f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskState {
    columns: BTreeMap<SignalColumn, SignalStats>,
}

impl RiskState {
    /// Summarize `columns` over `population`.
    /// An empty population is a construction error, never 0/0 statistics.
    pub fn build(
        population: &[EngineeredSignals],
        columns: &[SignalColumn],
    ) -> PipelineResult<Self> {
        if population.is_empty() {
            return Err(PipelineError::EmptyPopulation);
        }

        let columns = columns
            .iter()
            .map(|&column| {
                let values: Vec<f64> = population.iter().map(|s| s.value(column)).collect();
                (column, column_stats(&values))
            })
            .collect();

        Ok(Self { columns })
    }

    pub fn get(&self, column: SignalColumn) -> Option<&SignalStats> {
        self.columns.get(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SignalColumn, &SignalStats)> {
        self.columns.iter().map(|(c, s)| (*c, s))
    }

    /// Assemble a risk state from precomputed statistics.
    pub fn from_stats(stats: impl IntoIterator<Item = (SignalColumn, SignalStats)>) -> Self {
        Self { columns: stats.into_iter().collect() }
    }
}

/// NaN entries are skipped, as a dataframe reduction would.
/// A column with no usable values summarizes to all zeros.
fn column_stats(values: &[f64]) -> SignalStats {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return SignalStats { mean: 0.0, p75: 0.0, p90: 0.0, max: 0.0 };
    }
    sorted.sort_by(f64::total_cmp);

    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
    SignalStats {
        mean,
        p75: percentile(&sorted, 0.75),
        p90: percentile(&sorted, 0.90),
        max: sorted[sorted.len() - 1],
    }
}

/// Linear-interpolation quantile over an ascending, non-empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
    }
}
