//! Domain evaluators: Operations, Finance and CX.
//!
//! One algorithm, parameterized by signal column:
//!   1. threshold_high = p75 of the column (full population)
//!   2. threshold_near = near_factor × threshold_high
//!   3. partition the PRIORITIZED set into high / near / rest
//!   4. first match wins: high_ratio ≥ 0.25 → high,
//!      near_ratio ≥ 0.20 → medium, else low.

use crate::{
    agent::{names, AgentOutput, EvaluationContext, Evaluator, Severity},
    config::EvaluatorThresholds,
    signals::SignalColumn,
    types::round2,
};
use serde::{Deserialize, Serialize};

pub const LOW_CONFIDENCE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    Stable,
    EarlyWarning,
    RiskDetected,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainAssessment {
    pub agent:           String,
    pub status:          DomainStatus,
    pub severity:        Severity,
    pub confidence:      f64,
    pub high_risk_ratio: f64,
    pub near_risk_ratio: f64,
    pub diagnosis:       String,
}

/// Fixed per-domain parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainProfile {
    pub name:              &'static str,
    pub column:            SignalColumn,
    pub high_confidence:   f64,
    pub medium_confidence: f64,
    pub high_diagnosis:    &'static str,
    pub medium_diagnosis:  &'static str,
    pub low_diagnosis:     &'static str,
}

impl DomainProfile {
    pub const OPERATIONS: DomainProfile = DomainProfile {
        name:              names::OPERATIONS,
        column:            SignalColumn::OpsStress,
        high_confidence:   0.9,
        medium_confidence: 0.7,
        high_diagnosis:    "Multiple customers experiencing operational stress",
        medium_diagnosis:  "Customers approaching operational stress threshold",
        low_diagnosis:     "Operational metrics within normal range",
    };

    pub const FINANCE: DomainProfile = DomainProfile {
        name:              names::FINANCE,
        column:            SignalColumn::FinancialStress,
        high_confidence:   0.9,
        medium_confidence: 0.7,
        high_diagnosis:    "Significant billing or payment stress detected",
        medium_diagnosis:  "Customers drifting toward financial stress",
        low_diagnosis:     "Financial metrics within normal range",
    };

    pub const CX: DomainProfile = DomainProfile {
        name:              names::CX,
        column:            SignalColumn::CxStress,
        high_confidence:   0.85,
        medium_confidence: 0.65,
        high_diagnosis:    "Widespread customer dissatisfaction detected",
        medium_diagnosis:  "Early signs of customer frustration emerging",
        low_diagnosis:     "Customer experience remains stable",
    };
}

pub struct DomainEvaluator {
    profile:    DomainProfile,
    thresholds: EvaluatorThresholds,
}

impl DomainEvaluator {
    pub fn new(profile: DomainProfile, thresholds: EvaluatorThresholds) -> Self {
        Self { profile, thresholds }
    }

    pub fn operations(thresholds: EvaluatorThresholds) -> Self {
        Self::new(DomainProfile::OPERATIONS, thresholds)
    }

    pub fn finance(thresholds: EvaluatorThresholds) -> Self {
        Self::new(DomainProfile::FINANCE, thresholds)
    }

    pub fn cx(thresholds: EvaluatorThresholds) -> Self {
        Self::new(DomainProfile::CX, thresholds)
    }

    pub fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    pub fn assess(&self, ctx: &EvaluationContext<'_>) -> DomainAssessment {
        let p = &self.profile;

        let threshold_high = match ctx.risk_state.and_then(|rs| rs.get(p.column)) {
            Some(stats) => stats.p75,
            None => {
                log::warn!("{}: no risk statistics for {}; reporting low", p.name, p.column);
                return DomainAssessment {
                    agent:           p.name.to_string(),
                    status:          DomainStatus::InsufficientData,
                    severity:        Severity::Low,
                    confidence:      0.0,
                    high_risk_ratio: 0.0,
                    near_risk_ratio: 0.0,
                    diagnosis:       "Insufficient data to assess risk".into(),
                };
            }
        };
        let threshold_near = self.thresholds.near_factor * threshold_high;

        let (mut high, mut near) = (0usize, 0usize);
        for row in ctx.prioritized {
            let value = row.value(p.column);
            if value >= threshold_high {
                high += 1;
            } else if value >= threshold_near {
                near += 1;
            }
        }

        // An empty set divides by 1 and falls through to low.
        let total = ctx.prioritized.len().max(1) as f64;
        let high_ratio = high as f64 / total;
        let near_ratio = near as f64 / total;

        let (severity, status, confidence, diagnosis) = if high_ratio >= self.thresholds.high_ratio {
            (Severity::High, DomainStatus::RiskDetected, p.high_confidence, p.high_diagnosis)
        } else if near_ratio >= self.thresholds.near_ratio {
            (Severity::Medium, DomainStatus::EarlyWarning, p.medium_confidence, p.medium_diagnosis)
        } else {
            (Severity::Low, DomainStatus::Stable, LOW_CONFIDENCE, p.low_diagnosis)
        };

        log::debug!(
            "{}: severity={} high_ratio={:.2} near_ratio={:.2} p75={:.3}",
            p.name,
            severity.as_str(),
            high_ratio,
            near_ratio,
            threshold_high,
        );

        DomainAssessment {
            agent: p.name.to_string(),
            status,
            severity,
            confidence,
            high_risk_ratio: round2(high_ratio),
            near_risk_ratio: round2(near_ratio),
            diagnosis: diagnosis.to_string(),
        }
    }
}

impl Evaluator for DomainEvaluator {
    fn name(&self) -> &'static str { self.profile.name }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> AgentOutput {
        AgentOutput::Domain(self.assess(ctx))
    }
}
