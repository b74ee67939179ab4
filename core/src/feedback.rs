//! Feedback recording: append-only snapshots of each run's decision.
//!
//! RULE: Sinks are write-only from the pipeline's point of view.
//! Nothing in a run reads feedback back, and a failed append never
//! aborts the run.

use crate::{
    synthesis_agent::FinalDecision,
    types::{RunId, SessionId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    /// Reserved for a reviewer's override; always None today.
    pub human_override:          Option<String>,
    pub final_decision_snapshot: FinalDecision,
    pub notes:                   String,
}

impl FeedbackPayload {
    pub fn snapshot(decision: &FinalDecision) -> Self {
        Self {
            human_override:          None,
            final_decision_snapshot: decision.clone(),
            notes:                   "No human override applied".into(),
        }
    }
}

/// One appended line. The timestamp is taken when the entry is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp:  DateTime<Utc>,
    pub run_id:     RunId,
    pub session_id: Option<SessionId>,
    pub feedback:   FeedbackPayload,
}

impl FeedbackEntry {
    pub fn new(run_id: RunId, session_id: Option<SessionId>, feedback: FeedbackPayload) -> Self {
        Self { timestamp: Utc::now(), run_id, session_id, feedback }
    }
}

pub trait FeedbackSink: Send {
    fn append(&self, entry: &FeedbackEntry) -> anyhow::Result<()>;
}

// ── JSON lines file ──────────────────────────────────────────────────────────

/// One JSON object per line, opened in append mode for every entry.
#[derive(Debug, Clone)]
pub struct JsonlFeedbackSink {
    path: PathBuf,
}

impl JsonlFeedbackSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl FeedbackSink for JsonlFeedbackSink {
    fn append(&self, entry: &FeedbackEntry) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

// ── In-memory ────────────────────────────────────────────────────────────────

/// Collects entries in a shared vector. Clones share the same storage,
/// so a test can keep one handle and give another to the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeedbackSink {
    entries: Arc<Mutex<Vec<FeedbackEntry>>>,
}

impl MemoryFeedbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<FeedbackEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl FeedbackSink for MemoryFeedbackSink {
    fn append(&self, entry: &FeedbackEntry) -> anyhow::Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("feedback buffer poisoned"))?
            .push(entry.clone());
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Default)]
pub struct NullFeedbackSink;

impl FeedbackSink for NullFeedbackSink {
    fn append(&self, _entry: &FeedbackEntry) -> anyhow::Result<()> {
        Ok(())
    }
}
