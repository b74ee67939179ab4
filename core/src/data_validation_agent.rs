//! Data validation: an independent data-quality gate.
//!
//! Reads the risk state and the full population. Its verdict feeds the
//! evaluation stage only; it neither gates nor is gated by the domain
//! evaluators, and it does not touch action-plan confidence.

use crate::{
    agent::{names, AgentOutput, EvaluationContext, Evaluator},
    signals::SignalColumn,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTrust {
    High,
    Medium,
    Low,
    Unknown,
}

impl DataTrust {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High    => "high",
            Self::Medium  => "medium",
            Self::Low     => "low",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidationReport {
    pub data_trust:            DataTrust,
    pub issues_detected:       bool,
    pub confidence_adjustment: f64,
    pub anomalous_columns:     Vec<SignalColumn>,
    pub notes:                 String,
}

pub struct DataValidationEvaluator {
    /// max > anomaly_multiplier × p75 flags a column.
    anomaly_multiplier: f64,
}

impl DataValidationEvaluator {
    pub fn new(anomaly_multiplier: f64) -> Self {
        Self { anomaly_multiplier }
    }

    pub fn validate(&self, ctx: &EvaluationContext<'_>) -> DataValidationReport {
        let risk_state = match ctx.risk_state {
            Some(rs) if !rs.is_empty() && !ctx.population.is_empty() => rs,
            _ => {
                log::warn!("data_validation: no risk state or population; trust=low");
                return DataValidationReport {
                    data_trust:            DataTrust::Low,
                    issues_detected:       true,
                    confidence_adjustment: 0.5,
                    anomalous_columns:     Vec::new(),
                    notes:                 "Insufficient data available for validation.".into(),
                };
            }
        };

        // p75 must be positive or the multiple is meaningless.
        let anomalous_columns: Vec<SignalColumn> = risk_state
            .iter()
            .filter(|(_, stats)| stats.p75 > 0.0 && stats.max > self.anomaly_multiplier * stats.p75)
            .map(|(column, _)| column)
            .collect();

        if anomalous_columns.is_empty() {
            log::debug!("data_validation: trust=high");
            return DataValidationReport {
                data_trust:            DataTrust::High,
                issues_detected:       false,
                confidence_adjustment: 1.0,
                anomalous_columns,
                notes:                 "Data appears consistent and reliable.".into(),
            };
        }

        let listed: Vec<&str> = anomalous_columns.iter().map(SignalColumn::as_str).collect();
        log::debug!("data_validation: trust=medium anomalies={listed:?}");
        DataValidationReport {
            data_trust:            DataTrust::Medium,
            issues_detected:       true,
            confidence_adjustment: 0.75,
            notes:                 format!(
                "Potential distribution anomalies detected in: {}",
                listed.join(", ")
            ),
            anomalous_columns,
        }
    }
}

impl Evaluator for DataValidationEvaluator {
    fn name(&self) -> &'static str { names::DATA_VALIDATION }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> AgentOutput {
        AgentOutput::DataValidation(self.validate(ctx))
    }
}
