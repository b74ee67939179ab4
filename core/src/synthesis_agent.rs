//! Synthesis: merges the three domain severities into one decision.
//!
//! PRECEDENCE (first match wins):
//!   any high   → critical
//!   any medium → warning
//!   otherwise  → stable
//! With no domain verdict at all the decision is unknown.

use crate::agent::{DomainSeverities, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Stable,
    Warning,
    Critical,
    Unknown,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable   => "stable",
            Self::Warning  => "warning",
            Self::Critical => "critical",
            Self::Unknown  => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalDecision {
    pub overall_status:     OverallStatus,
    pub attention_required: bool,
    /// Evaluators at the deciding severity; None when stable or unknown.
    pub primary_driver:     Option<Vec<String>>,
    pub summary:            String,
    pub confidence:         f64,
    /// Full severity snapshot, attached on every branch.
    pub agent_agreement:    BTreeMap<String, Option<Severity>>,
}

pub fn synthesize(severities: &DomainSeverities) -> FinalDecision {
    let agent_agreement: BTreeMap<String, Option<Severity>> = severities
        .entries()
        .iter()
        .map(|(name, severity)| (name.to_string(), *severity))
        .collect();

    let at = |level: Severity| -> Vec<String> {
        severities
            .entries()
            .iter()
            .filter(|(_, s)| *s == Some(level))
            .map(|(name, _)| name.to_string())
            .collect()
    };

    let high = at(Severity::High);
    let medium = at(Severity::Medium);

    let decision = if !high.is_empty() {
        FinalDecision {
            overall_status:     OverallStatus::Critical,
            attention_required: true,
            primary_driver:     Some(high),
            summary:            "Critical risk detected requiring immediate attention.".into(),
            confidence:         0.9,
            agent_agreement,
        }
    } else if !medium.is_empty() {
        FinalDecision {
            overall_status:     OverallStatus::Warning,
            attention_required: true,
            primary_driver:     Some(medium),
            summary:            "Early warning signals detected. Proactive attention recommended."
                .into(),
            confidence:         0.7,
            agent_agreement,
        }
    } else if severities.all_missing() {
        FinalDecision {
            overall_status:     OverallStatus::Unknown,
            attention_required: false,
            primary_driver:     None,
            summary:            "Insufficient information to make a decision.".into(),
            confidence:         0.0,
            agent_agreement,
        }
    } else {
        FinalDecision {
            overall_status:     OverallStatus::Stable,
            attention_required: false,
            primary_driver:     None,
            summary:            "Operations, finance, and customer experience signals are within \
                                 normal ranges today. No immediate attention required."
                .into(),
            confidence:         0.85,
            agent_agreement,
        }
    };

    log::debug!(
        "synthesis: status={} drivers={:?}",
        decision.overall_status.as_str(),
        decision.primary_driver,
    );

    decision
}
