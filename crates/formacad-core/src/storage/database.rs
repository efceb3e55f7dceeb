//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - Completed study sessions, keyed by the day they were credited to
//! - Per-day statistics
//! - Key-value store for application state (e.g. the serialized timer)

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::events::Event;
use crate::timer::{DailyStats, SessionType, Technique};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub subject: String,
    pub session_type: SessionType,
    pub technique: Technique,
    pub duration_min: u32,
    pub day: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a record from a completion event. Other events yield `None`.
    pub fn from_event(event: &Event, day: NaiveDate) -> Option<Self> {
        match event {
            Event::SessionCompleted {
                subject,
                session_type,
                technique,
                duration_min,
                started_at,
                at,
                ..
            } => Some(Self {
                id: 0,
                subject: subject.clone(),
                session_type: *session_type,
                technique: *technique,
                duration_min: *duration_min,
                day,
                started_at: *started_at,
                completed_at: *at,
            }),
            _ => None,
        }
    }
}

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/formacad.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("formacad.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                subject      TEXT NOT NULL DEFAULT '',
                session_type TEXT NOT NULL,
                technique    TEXT NOT NULL,
                duration_min INTEGER NOT NULL,
                day          TEXT NOT NULL,
                started_at   TEXT NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_day_type ON sessions(day, session_type);",
        )?;
        Ok(())
    }

    /// Record a completed session. Returns the new row id.
    pub fn record_session(&self, record: &SessionRecord) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO sessions (subject, session_type, technique, duration_min, day, started_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.subject,
                    record.session_type.as_str(),
                    record.technique.as_str(),
                    record.duration_min,
                    record.day.to_string(),
                    record.started_at.to_rfc3339(),
                    record.completed_at.to_rfc3339(),
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Focus minutes and count of completed focus sessions for `day`.
    pub fn stats_for_day(&self, day: NaiveDate) -> Result<DailyStats> {
        let (count, minutes) = self
            .conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(duration_min), 0)
                 FROM sessions
                 WHERE day = ?1 AND session_type = 'focus'",
                params![day.to_string()],
                |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
            )
            .map_err(DatabaseError::from)?;
        Ok(DailyStats {
            total_minutes: minutes,
            session_count: count,
        })
    }

    /// Every completed session credited to `day`, oldest first.
    pub fn sessions_for_day(&self, day: NaiveDate) -> Result<Vec<SessionRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, subject, session_type, technique, duration_min, day, started_at, completed_at
                 FROM sessions
                 WHERE day = ?1
                 ORDER BY completed_at, id",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![day.to_string()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, subject, session_type, technique, duration_min, day, started_at, completed_at) =
                row.map_err(DatabaseError::from)?;
            records.push(SessionRecord {
                id,
                subject,
                session_type: session_type
                    .parse()
                    .map_err(|_| corrupt("session_type", &session_type))?,
                technique: technique
                    .parse()
                    .map_err(|_| corrupt("technique", &technique))?,
                duration_min,
                day: day.parse().map_err(|_| corrupt("day", &day))?,
                started_at: parse_timestamp("started_at", &started_at)?,
                completed_at: parse_timestamp("completed_at", &completed_at)?,
            });
        }
        Ok(records)
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }
}

fn corrupt(column: &str, value: &str) -> DatabaseError {
    DatabaseError::CorruptValue {
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupt(column, value))
}
