//! SQLite-based local storage.
//!
//! Provides persistent storage for:
//! - Focus sessions logged while offline
//! - Session statistics (daily, all-time, per-day history)
//! - Key-value store for timer settings

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::backend::{FocusSessionRecord, NewFocusSession};
use crate::error::{CoreError, DatabaseError};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_sessions: u64,
    pub total_focus_min: u64,
    pub today_sessions: u64,
    pub today_focus_min: u64,
}

/// Focus minutes logged on one calendar day (UTC).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyFocus {
    pub date: NaiveDate,
    pub minutes: u64,
}

/// SQLite database for local session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/focusflow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("focusflow.db");
        Ok(Self::open_at(path)?)
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    session_type TEXT NOT NULL,
                    duration_min INTEGER NOT NULL,
                    task_id      INTEGER,
                    completed_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Record a completed session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(
        &self,
        session: &NewFocusSession,
        completed_at: DateTime<Utc>,
    ) -> Result<FocusSessionRecord, DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (session_type, duration_min, task_id, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.session_type.as_str(),
                session.duration_minutes,
                session.task_id,
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(FocusSessionRecord {
            id: self.conn.last_insert_rowid(),
            user_id: None,
            duration_minutes: session.duration_minutes,
            session_type: session.session_type,
            task_id: session.task_id,
            completed_at,
        })
    }

    pub fn stats_today(&self) -> Result<Stats, DatabaseError> {
        self.stats_on(Utc::now().date_naive())
    }

    /// All-time totals plus the totals for `today`.
    pub fn stats_on(&self, today: NaiveDate) -> Result<Stats, DatabaseError> {
        let (total_sessions, total_focus_min) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_min), 0) FROM sessions",
            [],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;

        let (today_sessions, today_focus_min) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_min), 0)
             FROM sessions
             WHERE substr(completed_at, 1, 10) = ?1",
            params![today.format("%Y-%m-%d").to_string()],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;

        Ok(Stats {
            total_sessions,
            total_focus_min,
            today_sessions,
            today_focus_min,
        })
    }

    /// Focus minutes for each of the `days` days ending at `today`, oldest
    /// first. Days without sessions are reported as zero.
    pub fn focus_by_day(&self, today: NaiveDate, days: u32) -> Result<Vec<DailyFocus>, DatabaseError> {
        if days == 0 {
            return Ok(Vec::new());
        }
        let first = Duration::try_days(i64::from(days) - 1)
            .and_then(|span| today.checked_sub_signed(span))
            .ok_or_else(|| {
                DatabaseError::QueryFailed(format!("{days} days before {today} is out of range"))
            })?;

        let mut stmt = self.conn.prepare(
            "SELECT substr(completed_at, 1, 10) AS day, COALESCE(SUM(duration_min), 0)
             FROM sessions
             WHERE substr(completed_at, 1, 10) BETWEEN ?1 AND ?2
             GROUP BY day",
        )?;
        let rows = stmt.query_map(
            params![
                first.format("%Y-%m-%d").to_string(),
                today.format("%Y-%m-%d").to_string()
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)),
        )?;

        let mut totals = std::collections::HashMap::new();
        for row in rows {
            let (day, minutes) = row?;
            if let Ok(date) = NaiveDate::parse_from_str(&day, "%Y-%m-%d") {
                totals.insert(date, minutes);
            }
        }

        Ok(first
            .iter_days()
            .take(days as usize)
            .map(|date| DailyFocus {
                date,
                minutes: totals.get(&date).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Distinct days (UTC) with at least one logged session.
    pub fn focus_dates(&self) -> Result<Vec<NaiveDate>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT substr(completed_at, 1, 10) FROM sessions ORDER BY 1",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut dates = Vec::new();
        for row in rows {
            if let Ok(date) = NaiveDate::parse_from_str(&row?, "%Y-%m-%d") {
                dates.push(date);
            }
        }
        Ok(dates)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Set several values in one transaction; either all land or none do.
    pub fn kv_set_many(&self, entries: &[(&str, String)]) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn kv_delete_many(&self, keys: &[&str]) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        for key in keys {
            tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        }
        tx.commit()?;
        Ok(())
    }
}
