//! Evaluator trait and the shared output map.
//!
//! RULE: Every evaluator implements Evaluator and is a pure function of
//! its EvaluationContext. Only the engine writes to AgentOutputs, one
//! entry at a time, in the order documented in engine.rs.

use crate::{
    action_agent::ActionPlan,
    data_validation_agent::DataValidationReport,
    domain_agent::DomainAssessment,
    evaluation_agent::EvaluationReport,
    explainer::ExecutiveSummary,
    feedback::FeedbackPayload,
    risk_state::RiskState,
    signals::EngineeredSignals,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable evaluator names, used as AgentOutputs keys.
pub mod names {
    pub const OPERATIONS: &str = "operations";
    pub const FINANCE: &str = "finance";
    pub const CX: &str = "cx";
    pub const DATA_VALIDATION: &str = "data_validation";
    pub const ACTION_EXPLAINABILITY: &str = "action_explainability";
    pub const EVALUATION: &str = "evaluation";
    pub const EXPLAINER: &str = "explainer";
    pub const FEEDBACK: &str = "feedback";
}

/// Ordinal severity. Declaration order is the ordering: Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low    => "low",
            Self::Medium => "medium",
            Self::High   => "high",
        }
    }
}

/// Read-only inputs handed to every evaluator.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// The top-K working set.
    pub prioritized: &'a [EngineeredSignals],
    /// The full engineered population.
    pub population:  &'a [EngineeredSignals],
    /// None only when feature engineering was bypassed.
    pub risk_state:  Option<&'a RiskState>,
}

/// The contract every evaluator must fulfill.
pub trait Evaluator: Send {
    /// Unique stable name; the key of this evaluator's output.
    fn name(&self) -> &'static str;

    /// Never fails. Missing inputs produce a well-formed low-confidence output.
    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> AgentOutput;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentOutput {
    Domain(DomainAssessment),
    DataValidation(DataValidationReport),
    ActionExplainability(ActionPlan),
    Evaluation(EvaluationReport),
    Explainer(ExecutiveSummary),
    Feedback(FeedbackPayload),
}

impl AgentOutput {
    /// Only domain assessments carry a severity.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::Domain(d) => Some(d.severity),
            _ => None,
        }
    }
}

/// Evaluator name → output. Written incrementally by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentOutputs {
    entries: BTreeMap<String, AgentOutput>,
}

impl AgentOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one evaluator's output. A second write under the same name
    /// replaces the first.
    pub fn record(&mut self, name: &str, output: AgentOutput) {
        if self.entries.insert(name.to_string(), output).is_some() {
            log::warn!("agent_outputs: '{name}' written twice; keeping the latest");
        }
    }

    pub fn get(&self, name: &str) -> Option<&AgentOutput> {
        self.entries.get(name)
    }

    pub fn severity_of(&self, name: &str) -> Option<Severity> {
        self.get(name).and_then(AgentOutput::severity)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AgentOutput)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the three domain severities.
    pub fn domain_severities(&self) -> DomainSeverities {
        DomainSeverities {
            operations: self.severity_of(names::OPERATIONS),
            finance:    self.severity_of(names::FINANCE),
            cx:         self.severity_of(names::CX),
        }
    }
}

/// The three domain verdicts consumed by action planning and synthesis.
/// None means the evaluator never reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSeverities {
    pub operations: Option<Severity>,
    pub finance:    Option<Severity>,
    pub cx:         Option<Severity>,
}

impl DomainSeverities {
    /// (name, severity) in reporting order: operations, finance, cx.
    pub fn entries(&self) -> [(&'static str, Option<Severity>); 3] {
        [
            (names::OPERATIONS, self.operations),
            (names::FINANCE, self.finance),
            (names::CX, self.cx),
        ]
    }

    pub fn all_missing(&self) -> bool {
        self.operations.is_none() && self.finance.is_none() && self.cx.is_none()
    }
}
