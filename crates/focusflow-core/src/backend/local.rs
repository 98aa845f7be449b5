//! Session logs backed by the local SQLite database.
//!
//! [`LocalSessionLog`] is the whole log when no backend is configured.
//! [`MirroredSessionLog`] writes to a remote log first and keeps a local copy
//! of every stored row, so local stats cover remote sessions too.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use super::traits::SessionLogger;
use super::types::{FocusSessionRecord, NewFocusSession};
use crate::error::{DatabaseError, LoggingError};
use crate::storage::Database;

pub struct LocalSessionLog {
    db: Mutex<Database>,
}

impl LocalSessionLog {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn record(
        &self,
        session: &NewFocusSession,
        completed_at: DateTime<Utc>,
    ) -> Result<FocusSessionRecord, DatabaseError> {
        let db = self
            .db
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("session log lock poisoned".into()))?;
        db.record_session(session, completed_at)
    }
}

#[async_trait]
impl SessionLogger for LocalSessionLog {
    fn name(&self) -> &str {
        "local"
    }

    async fn log_session(
        &self,
        session: NewFocusSession,
    ) -> Result<FocusSessionRecord, LoggingError> {
        Ok(self.record(&session, Utc::now())?)
    }
}

pub struct MirroredSessionLog<P> {
    primary: P,
    local: LocalSessionLog,
}

impl<P: SessionLogger> MirroredSessionLog<P> {
    pub fn new(primary: P, local: LocalSessionLog) -> Self {
        Self { primary, local }
    }
}

#[async_trait]
impl<P: SessionLogger> SessionLogger for MirroredSessionLog<P> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    /// The primary outcome decides success. A failed local copy is only
    /// logged.
    async fn log_session(
        &self,
        session: NewFocusSession,
    ) -> Result<FocusSessionRecord, LoggingError> {
        let record = self.primary.log_session(session.clone()).await?;
        if let Err(e) = self.local.record(&session, record.completed_at) {
            warn!(error = %e, id = record.id, "failed to mirror focus session locally");
        }
        Ok(record)
    }
}
