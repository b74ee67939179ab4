//! Evaluation: how far the final decision can be trusted.
//!
//! Inputs: cross-evaluator agreement on "high", whether the action plan
//! has entries, and the data-validation trust level.
//!
//! NOTE: high agreement WITHOUT actions yields RELIABLE_WITH_CAUTION,
//! not RELIABLE.

use crate::{
    agent::{names, AgentOutput, AgentOutputs, Severity},
    data_validation_agent::DataTrust,
    synthesis_agent::FinalDecision,
    types::round2,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Reliable,
    ReliableWithCaution,
    NeedsReview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationNotes {
    pub high_severity_agents: Vec<String>,
    pub actions_present:      bool,
    pub data_trust:           DataTrust,
    pub decision_status:      String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub agreement_score:     usize,
    pub agreement_level:     AgreementLevel,
    pub decision_confidence: f64,
    pub verdict:             Verdict,
    pub notes:               EvaluationNotes,
}

pub fn evaluate_decision(outputs: &AgentOutputs, decision: &FinalDecision) -> EvaluationReport {
    // Any evaluator counts, not only the three domain ones.
    let high_severity_agents: Vec<String> = outputs
        .iter()
        .filter(|(_, output)| output.severity() == Some(Severity::High))
        .map(|(name, _)| name.to_string())
        .collect();

    let agreement_score = high_severity_agents.len();
    let agreement_level = match agreement_score {
        0 => AgreementLevel::Low,
        1 => AgreementLevel::Medium,
        _ => AgreementLevel::High,
    };

    let actions_present = matches!(
        outputs.get(names::ACTION_EXPLAINABILITY),
        Some(AgentOutput::ActionExplainability(plan)) if plan.has_actions()
    );

    let data_trust = match outputs.get(names::DATA_VALIDATION) {
        Some(AgentOutput::DataValidation(report)) => report.data_trust,
        _ => DataTrust::Unknown,
    };

    let decision_confidence = round2(
        (0.4 + 0.2 * agreement_score as f64
            + if actions_present { 0.2 } else { 0.0 }
            + if data_trust == DataTrust::High { 0.1 } else { 0.0 })
        .min(0.95),
    );

    let verdict = match agreement_level {
        AgreementLevel::High if actions_present => Verdict::Reliable,
        AgreementLevel::High | AgreementLevel::Medium => Verdict::ReliableWithCaution,
        AgreementLevel::Low => Verdict::NeedsReview,
    };

    log::debug!(
        "evaluation: agreement={agreement_score} actions={actions_present} trust={} verdict={verdict:?}",
        data_trust.as_str(),
    );

    EvaluationReport {
        agreement_score,
        agreement_level,
        decision_confidence,
        verdict,
        notes: EvaluationNotes {
            high_severity_agents,
            actions_present,
            data_trust,
            decision_status: decision.overall_status.as_str().to_string(),
        },
    }
}
