//! SQLite persistence for customer rows and the feedback log.
//!
//! RULE: SQL lives here and nowhere else.
//! The engine sees the store only as a CustomerSource or a FeedbackSink.

use crate::error::PipelineResult;
use rusqlite::Connection;
use uuid::Uuid;

mod customer;
mod feedback;

/// Schema scripts, applied in order. Each one is idempotent.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_foundation",
    include_str!("../../../migrations/001_foundation.sql"),
)];

pub struct PipelineStore {
    conn:     Connection,
    location: Location,
}

enum Location {
    File(String),
    /// Shared-cache URI, so every connection to it sees one database.
    Memory(String),
}

impl PipelineStore {
    /// `:memory:` opens a fresh shared in-memory database.
    pub fn open(path: &str) -> PipelineResult<Self> {
        if path == ":memory:" {
            return Self::in_memory();
        }
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        log::debug!("store: opened {path} (journal_mode={mode})");
        Ok(Self { conn, location: Location::File(path.to_owned()) })
    }

    /// Each call gets its own database; `reopen` joins it.
    pub fn in_memory() -> PipelineResult<Self> {
        let uri = format!("file:opsrisk_{}?mode=memory&cache=shared", Uuid::new_v4().simple());
        Ok(Self { conn: Connection::open(&uri)?, location: Location::Memory(uri) })
    }

    /// A second connection to the same database, so one store can serve
    /// customers while another records feedback.
    /// An in-memory database lives while either connection is open.
    pub fn reopen(&self) -> PipelineResult<Self> {
        match &self.location {
            Location::File(path) => Self::open(path),
            Location::Memory(uri) => Ok(Self {
                conn:     Connection::open(uri)?,
                location: Location::Memory(uri.clone()),
            }),
        }
    }

    /// Label used in log lines and `CustomerSource::describe`.
    pub fn location(&self) -> &str {
        match &self.location {
            Location::File(path) => path,
            Location::Memory(_) => ":memory:",
        }
    }

    pub fn migrate(&self) -> PipelineResult<()> {
        for (name, sql) in MIGRATIONS {
            self.conn.execute_batch(sql)?;
            log::debug!("store: migration {name} applied");
        }
        Ok(())
    }
}
