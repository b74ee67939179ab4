//! The pipeline engine. One call to `run` is one end-to-end decision.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Query understanding
//!   2. Feature engineering    (signals, risk state, amplification, top-K)
//!   3. Watchlist + priority ranking   (full population)
//!   4. Operations evaluator
//!   5. Finance evaluator
//!   6. CX evaluator
//!   7. Data validation
//!   8. Action explainability  (reads the domain severities)
//!   9. Synthesis              (final decision)
//!  10. Evaluation             (audits the decision)
//!  11. Explainer              (executive summary, bounded by a timeout)
//!  12. Feedback               (append-only record)
//!
//! RULES:
//!   - The engine is the only writer of AgentOutputs.
//!   - Evaluators never call each other; later stages read earlier
//!     outputs from the map.
//!   - Only the data source and feature engineering can fail a run.
//!     Explainer and feedback failures degrade, they never abort.

use crate::{
    action_agent::ActionPlanner,
    agent::{names, AgentOutput, AgentOutputs, EvaluationContext, Evaluator},
    config::PipelineConfig,
    data_source::CustomerSource,
    data_validation_agent::DataValidationEvaluator,
    domain_agent::DomainEvaluator,
    error::PipelineResult,
    evaluation_agent::evaluate_decision,
    explainer::{summarize, BoundedGenerator, ExecutiveSummary, TextGenerator, UnavailableGenerator},
    features::build_features,
    feedback::{FeedbackEntry, FeedbackPayload, FeedbackSink, NullFeedbackSink},
    query::{understand_query, QueryIntent},
    risk_state::RiskState,
    scoring::{build_watchlist, WatchlistEntry},
    signals::EngineeredSignals,
    strategy_agent::{rank_priorities, PriorityEntry},
    synthesis_agent::{synthesize, FinalDecision},
    types::{RunId, SessionId},
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id:             RunId,
    pub query:              String,
    pub session_id:         Option<SessionId>,
    pub intent:             QueryIntent,
    pub risk_state:         RiskState,
    /// The prioritized working set.
    pub engineered_signals: Vec<EngineeredSignals>,
    pub watchlist:          Vec<WatchlistEntry>,
    pub priority_ranking:   Vec<PriorityEntry>,
    pub agent_outputs:      AgentOutputs,
    pub final_decision:     FinalDecision,
    pub executive_summary:  Option<ExecutiveSummary>,
}

pub struct PipelineEngine {
    config:     PipelineConfig,
    source:     Box<dyn CustomerSource>,
    generator:  Arc<dyn TextGenerator>,
    feedback:   Box<dyn FeedbackSink>,
    evaluators: Vec<Box<dyn Evaluator>>,
}

impl PipelineEngine {
    /// An engine with no evaluators registered, no text generator and
    /// no feedback sink.
    pub fn new(config: PipelineConfig, source: Box<dyn CustomerSource>) -> Self {
        Self {
            config,
            source,
            generator:  Arc::new(UnavailableGenerator),
            feedback:   Box::new(NullFeedbackSink),
            evaluators: Vec::new(),
        }
    }

    /// Build a fully wired engine with all evaluators registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: PipelineConfig, source: Box<dyn CustomerSource>) -> Self {
        let thresholds = config.evaluator.clone();
        let anomaly_multiplier = config.anomaly_multiplier;
        let mut engine = PipelineEngine::new(config, source);

        // Registration order is execution order.
        engine.register(Box::new(DomainEvaluator::operations(thresholds.clone())));
        engine.register(Box::new(DomainEvaluator::finance(thresholds.clone())));
        engine.register(Box::new(DomainEvaluator::cx(thresholds)));
        engine.register(Box::new(DataValidationEvaluator::new(anomaly_multiplier)));
        engine
    }

    /// Register an evaluator. Call in the documented execution order.
    pub fn register(&mut self, evaluator: Box<dyn Evaluator>) {
        self.evaluators.push(evaluator);
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_feedback_sink(mut self, sink: Box<dyn FeedbackSink>) -> Self {
        self.feedback = sink;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn evaluator_names(&self) -> Vec<&'static str> {
        self.evaluators.iter().map(|e| e.name()).collect()
    }

    pub fn run(&self, query: &str, session_id: Option<&str>) -> PipelineResult<RunReport> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let intent = understand_query(query);
        log::info!(
            "run={run_id} start: source={} intent={:?} urgency={:?}",
            self.source.describe(),
            intent.intent,
            intent.urgency,
        );

        let records = self.source.load()?;
        let features = build_features(&records, self.config.top_k)?;
        log::debug!(
            "run={run_id} features: population={} prioritized={}",
            features.population.len(),
            features.prioritized.len(),
        );

        let watchlist = build_watchlist(
            &features.population,
            &features.risk_state,
            self.config.watchlist_size,
        );
        let priority_ranking = rank_priorities(
            &features.population,
            &features.risk_state,
            self.config.strategy_top_n,
            self.config.proximity_cap,
        );

        let ctx = EvaluationContext {
            prioritized: &features.prioritized,
            population:  &features.population,
            risk_state:  Some(&features.risk_state),
        };

        let mut outputs = AgentOutputs::new();
        for evaluator in &self.evaluators {
            let output = evaluator.evaluate(&ctx);
            log::debug!(
                "run={run_id} {}: severity={}",
                evaluator.name(),
                output.severity().map_or("n/a", |s| s.as_str()),
            );
            outputs.record(evaluator.name(), output);
        }

        let severities = outputs.domain_severities();
        let plan = ActionPlanner::new(self.config.critical_risk_score).plan(
            ctx.prioritized,
            ctx.risk_state,
            &severities,
        );
        outputs.record(names::ACTION_EXPLAINABILITY, AgentOutput::ActionExplainability(plan));

        let final_decision = synthesize(&severities);
        log::info!(
            "run={run_id} synthesis: status={} confidence={:.2}",
            final_decision.overall_status.as_str(),
            final_decision.confidence,
        );

        let evaluation = evaluate_decision(&outputs, &final_decision);
        log::debug!(
            "run={run_id} evaluation: agreement={} verdict={:?}",
            evaluation.agreement_score,
            evaluation.verdict,
        );
        outputs.record(names::EVALUATION, AgentOutput::Evaluation(evaluation));

        let generator = BoundedGenerator::new(
            Arc::clone(&self.generator),
            Duration::from_millis(self.config.explainer_timeout_ms),
        );
        let executive_summary = summarize(&generator, &features.prioritized, &final_decision);
        if let Some(summary) = &executive_summary {
            outputs.record(names::EXPLAINER, AgentOutput::Explainer(summary.clone()));
        }

        let payload = FeedbackPayload::snapshot(&final_decision);
        let entry = FeedbackEntry::new(
            run_id.clone(),
            session_id.map(str::to_string),
            payload.clone(),
        );
        if let Err(e) = self.feedback.append(&entry) {
            log::warn!("run={run_id} feedback: append failed: {e}");
        }
        outputs.record(names::FEEDBACK, AgentOutput::Feedback(payload));

        log::info!("run={run_id} done: outputs={}", outputs.len());

        Ok(RunReport {
            run_id,
            query: query.to_string(),
            session_id: session_id.map(str::to_string),
            intent,
            risk_state: features.risk_state,
            engineered_signals: features.prioritized,
            watchlist,
            priority_ranking,
            agent_outputs: outputs,
            final_decision,
            executive_summary,
        })
    }
}
