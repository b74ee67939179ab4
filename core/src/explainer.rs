//! Executive summary: the one external call in a run.
//!
//! RULE: This stage is read-only. It never changes a decision and it
//! never aborts the run: any generator failure, including a timeout,
//! becomes placeholder text.

use crate::{signals::EngineeredSignals, synthesis_agent::FinalDecision};
use serde::{Deserialize, Serialize};
use std::{sync::mpsc, sync::Arc, thread, time::Duration};

pub const SUMMARY_CONFIDENCE: f64 = 0.75;

/// Text-generation collaborator. May fail for any reason.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Always fails. Used when no model is wired in.
#[derive(Debug, Clone, Default)]
pub struct UnavailableGenerator;

impl TextGenerator for UnavailableGenerator {
    fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("no text generator configured")
    }
}

/// Returns the same text for every prompt.
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    text: String,
}

impl StaticGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextGenerator for StaticGenerator {
    fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.text.clone())
    }
}

/// Bounds any generator by wall-clock time.
/// The call runs on a worker thread; past the deadline the caller
/// gets an error and the worker's eventual reply is discarded.
/// A timed-out worker is detached, not joined: a generator that never
/// returns leaks one thread per call.
pub struct BoundedGenerator {
    inner:   Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl BoundedGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl TextGenerator for BoundedGenerator {
    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let prompt = prompt.to_string();

        thread::Builder::new()
            .name("text-generate".into())
            .spawn(move || {
                // The receiver may be gone after a timeout.
                let _ = tx.send(inner.generate(&prompt));
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                anyhow::bail!("timed out after {} ms", self.timeout.as_millis())
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                anyhow::bail!("generator worker exited without a reply")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub executive_summary: String,
    pub confidence:        f64,
}

pub fn build_prompt(
    top_customers: &[EngineeredSignals],
    decision: &FinalDecision,
) -> anyhow::Result<String> {
    let customers = serde_json::to_string_pretty(top_customers)?;
    let decision = serde_json::to_string_pretty(decision)?;
    Ok(format!(
        "You are an enterprise risk analyst.\n\
         \n\
         Explain in simple language:\n\
         - Why these customers need attention\n\
         - Provide a short executive summary\n\
         \n\
         Do NOT invent data.\n\
         Do NOT suggest actions.\n\
         \n\
         Top Customers:\n{customers}\n\
         \n\
         Final Decision:\n{decision}\n"
    ))
}

/// None when there is nothing to explain.
pub fn summarize(
    generator: &dyn TextGenerator,
    top_customers: &[EngineeredSignals],
    decision: &FinalDecision,
) -> Option<ExecutiveSummary> {
    if top_customers.is_empty() {
        return None;
    }

    let text = build_prompt(top_customers, decision)
        .and_then(|prompt| generator.generate(&prompt))
        .map(|text| text.trim().to_string());

    let executive_summary = match text {
        Ok(text) => text,
        Err(e) => {
            log::warn!("explainer: text generation failed: {e}");
            format!("explanation unavailable: {e}")
        }
    };

    Some(ExecutiveSummary { executive_summary, confidence: SUMMARY_CONFIDENCE })
}
