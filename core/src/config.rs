use crate::prioritization::DEFAULT_TOP_K;
use serde::{Deserialize, Serialize};

/// Ratio thresholds shared by the three domain evaluators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluatorThresholds {
    /// Share of the prioritized set at or above p75 that makes a domain "high".
    pub high_ratio: f64,
    /// Share of the prioritized set in the near band that makes a domain "medium".
    pub near_ratio: f64,
    /// The near band starts at `near_factor × p75`.
    pub near_factor: f64,
}

impl Default for EvaluatorThresholds {
    fn default() -> Self {
        Self {
            high_ratio:  0.25,
            near_ratio:  0.20,
            near_factor: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Size of the prioritized working set.
    pub top_k: usize,
    /// Size of the p75-ratio watchlist.
    pub watchlist_size: usize,
    /// Size of the proximity ranking ("top customers today").
    pub strategy_top_n: usize,
    /// Upper bound applied to each p90 proximity in the strategy ranking.
    pub proximity_cap: f64,
    pub evaluator: EvaluatorThresholds,
    /// Action plan rows at or above this customer risk score are CRITICAL.
    pub critical_risk_score: f64,
    /// A column is anomalous when its max exceeds `anomaly_multiplier × p75`.
    pub anomaly_multiplier: f64,
    /// Wall-clock bound on the text-generation call.
    pub explainer_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k:                DEFAULT_TOP_K,
            watchlist_size:       5,
            strategy_top_n:       5,
            proximity_cap:        1.5,
            evaluator:            EvaluatorThresholds::default(),
            critical_risk_score:  6.5,
            anomaly_multiplier:   3.0,
            explainer_timeout_ms: 15_000,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file. Absent fields keep their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.top_k == 0 {
            anyhow::bail!("top_k must be at least 1");
        }
        if self.proximity_cap <= 0.0 {
            anyhow::bail!("proximity_cap must be positive, got {}", self.proximity_cap);
        }
        let t = &self.evaluator;
        for (name, value) in [
            ("evaluator.high_ratio", t.high_ratio),
            ("evaluator.near_ratio", t.near_ratio),
            ("evaluator.near_factor", t.near_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{name} must be between 0.0 and 1.0, got {value}");
            }
        }
        if self.anomaly_multiplier < 1.0 {
            anyhow::bail!(
                "anomaly_multiplier must be at least 1.0, got {}",
                self.anomaly_multiplier
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "top_k": 25, "evaluator": { "high_ratio": 0.3 } }"#)
                .unwrap();
        assert_eq!(config.top_k, 25);
        assert_eq!(config.evaluator.high_ratio, 0.3);
        assert_eq!(config.evaluator.near_ratio, 0.20);
        assert_eq!(config.watchlist_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let config = PipelineConfig { top_k: 0, ..PipelineConfig::default() };
        assert!(config.validate().is_err());
    }
}
