use super::PipelineStore;
use crate::{
    error::PipelineResult,
    feedback::{FeedbackEntry, FeedbackSink},
};
use rusqlite::params;

impl PipelineStore {
    // ── Feedback log (append-only) ────────────────────────────────

    pub fn append_feedback(&self, entry: &FeedbackEntry) -> PipelineResult<()> {
        let payload = serde_json::to_string(entry)?;
        self.conn.execute(
            "INSERT INTO feedback_log (run_id, session_id, recorded_at, overall_status, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &entry.run_id,
                &entry.session_id,
                entry.timestamp.to_rfc3339(),
                entry.feedback.final_decision_snapshot.overall_status.as_str(),
                payload
            ],
        )?;
        Ok(())
    }

    pub fn feedback_for_run(&self, run_id: &str) -> PipelineResult<Vec<FeedbackEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM feedback_log WHERE run_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![run_id], |row| row.get::<_, String>(0))?;
        let mut entries = Vec::new();
        for payload in rows {
            entries.push(serde_json::from_str::<FeedbackEntry>(&payload?)?);
        }
        Ok(entries)
    }

    /// Most recent entries first.
    pub fn recent_feedback(&self, limit: usize) -> PipelineResult<Vec<FeedbackEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM feedback_log ORDER BY id DESC LIMIT ?1")?;
        let rows = stmt.query_map(params![limit as i64], |row| row.get::<_, String>(0))?;
        let mut entries = Vec::new();
        for payload in rows {
            entries.push(serde_json::from_str::<FeedbackEntry>(&payload?)?);
        }
        Ok(entries)
    }

    pub fn feedback_count(&self) -> PipelineResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM feedback_log", [], |r| r.get(0))?)
    }
}

impl FeedbackSink for PipelineStore {
    fn append(&self, entry: &FeedbackEntry) -> anyhow::Result<()> {
        Ok(self.append_feedback(entry)?)
    }
}
