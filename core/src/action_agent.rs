//! Action & explainability: per-customer explanations and remediation.
//!
//! The primary driver is chosen ONCE per run from the domain severities
//! (cx > operations > finance > monitoring) and applied to every row of
//! the plan. The per-customer driver lives in strategy_agent.rs.

use crate::{
    agent::{DomainSeverities, Severity},
    risk_state::RiskState,
    signals::{EngineeredSignals, SignalColumn},
    types::{round2, CustomerId},
};
use serde::{Deserialize, Serialize};

pub const BASE_CONFIDENCE: f64 = 0.6;
pub const CONFIDENCE_PER_EXPLANATION: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryDriver {
    Cx,
    Operations,
    Finance,
    Monitoring,
}

impl PrimaryDriver {
    /// First high severity wins, in the order cx, operations, finance.
    pub fn select(severities: &DomainSeverities) -> Self {
        let high = |s: Option<Severity>| s == Some(Severity::High);
        if high(severities.cx) {
            Self::Cx
        } else if high(severities.operations) {
            Self::Operations
        } else if high(severities.finance) {
            Self::Finance
        } else {
            Self::Monitoring
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cx         => "cx",
            Self::Operations => "operations",
            Self::Finance    => "finance",
            Self::Monitoring => "monitoring",
        }
    }

    pub fn recommended_actions(&self) -> Vec<RecommendedAction> {
        let entries: &[(&str, &str, &str)] = match self {
            Self::Cx => &[
                ("Customer Experience", "Immediate proactive outreach by senior support agent", "P0"),
                ("Retention", "Assign retention specialist", "P1"),
            ],
            Self::Operations => &[
                ("Operations", "Investigate recurring service instability", "P0"),
                ("Engineering", "Root cause analysis and remediation", "P1"),
            ],
            Self::Finance => &[
                ("Finance", "Review billing and payment anomalies", "P0"),
                ("Risk", "Assess credit exposure", "P1"),
            ],
            Self::Monitoring => &[("Monitoring", "Continue observation", "P2")],
        };

        entries
            .iter()
            .map(|(team, action, priority)| RecommendedAction {
                team:     team.to_string(),
                action:   action.to_string(),
                priority: priority.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub team:     String,
    pub action:   String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlanEntry {
    pub customer_id:         CustomerId,
    pub risk_score:          f64,
    pub risk_level:          RiskLevel,
    pub primary_driver:      PrimaryDriver,
    pub explanation:         Vec<String>,
    pub recommended_actions: Vec<RecommendedAction>,
    pub confidence:          f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub actions:    Vec<ActionPlanEntry>,
    /// Mean of entry confidences; 0 for an empty plan.
    pub confidence: f64,
}

impl ActionPlan {
    pub fn empty() -> Self {
        Self { actions: Vec::new(), confidence: 0.0 }
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }
}

pub struct ActionPlanner {
    /// Rows at or above this customer risk score are CRITICAL.
    critical_risk_score: f64,
}

impl ActionPlanner {
    pub fn new(critical_risk_score: f64) -> Self {
        Self { critical_risk_score }
    }

    /// Never fails: no customers or no risk state gives an empty plan.
    pub fn plan(
        &self,
        prioritized: &[EngineeredSignals],
        risk_state: Option<&RiskState>,
        severities: &DomainSeverities,
    ) -> ActionPlan {
        let risk_state = match risk_state {
            Some(rs) if !prioritized.is_empty() && !rs.is_empty() => rs,
            _ => return ActionPlan::empty(),
        };

        let primary_driver = PrimaryDriver::select(severities);

        let actions: Vec<ActionPlanEntry> = prioritized
            .iter()
            .map(|row| {
                let explanation = explain_customer(row, risk_state);
                let confidence = round2(
                    (BASE_CONFIDENCE + CONFIDENCE_PER_EXPLANATION * explanation.len() as f64)
                        .min(MAX_CONFIDENCE),
                );
                ActionPlanEntry {
                    customer_id: row.customer_id.clone(),
                    risk_score: row.customer_risk_score,
                    risk_level: self.risk_level(row.customer_risk_score),
                    primary_driver,
                    explanation,
                    recommended_actions: primary_driver.recommended_actions(),
                    confidence,
                }
            })
            .collect();

        let confidence =
            round2(actions.iter().map(|a| a.confidence).sum::<f64>() / actions.len() as f64);

        log::debug!(
            "action_explainability: driver={} entries={} confidence={confidence:.2}",
            primary_driver.as_str(),
            actions.len(),
        );

        ActionPlan { actions, confidence }
    }

    pub fn risk_level(&self, risk_score: f64) -> RiskLevel {
        if risk_score >= self.critical_risk_score {
            RiskLevel::Critical
        } else {
            RiskLevel::High
        }
    }
}

/// Independent tests; any subset of the five may fire.
pub fn explain_customer(row: &EngineeredSignals, risk_state: &RiskState) -> Vec<String> {
    let p75 = |column: SignalColumn| risk_state.get(column).map(|s| s.p75);
    let p90 = |column: SignalColumn| risk_state.get(column).map(|s| s.p90);
    let reaches = |column: SignalColumn, threshold: Option<f64>| {
        threshold.is_some_and(|t| row.value(column) >= t)
    };

    let mut explanations = Vec::new();

    if reaches(SignalColumn::UsageVolatility, p90(SignalColumn::UsageVolatility)) {
        explanations.push(format!(
            "Usage volatility is extremely high ({:.2}), above 90th percentile threshold",
            row.usage_volatility
        ));
    }
    if reaches(SignalColumn::CxStress, p90(SignalColumn::CxStress)) {
        explanations.push("Customer experience stress is critically elevated".to_string());
    }
    if reaches(SignalColumn::OpsStress, p75(SignalColumn::OpsStress)) {
        explanations.push("Frequent operational disruptions detected".to_string());
    }
    if reaches(SignalColumn::FinancialStress, p90(SignalColumn::FinancialStress)) {
        explanations.push("Financial exposure exceeds high-risk threshold".to_string());
    }
    if row.amplification_score >= 2 {
        explanations.push("Multiple risk signals are amplifying overall impact".to_string());
    }

    explanations
}
