use async_trait::async_trait;

use super::types::{FocusSessionRecord, NewFocusSession, Task};
use crate::error::{BackendError, LoggingError};

/// Writes completed focus sessions somewhere durable.
///
/// Implementations return the stored record so callers can use it directly
/// instead of re-reading the collection.
#[async_trait]
pub trait SessionLogger: Send + Sync {
    /// Short identifier used in logs (e.g. "supabase", "local").
    fn name(&self) -> &str;

    async fn log_session(
        &self,
        session: NewFocusSession,
    ) -> Result<FocusSessionRecord, LoggingError>;
}

/// Read-only supply of tasks that can be linked to a focus interval.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Incomplete tasks, oldest first.
    async fn pending_tasks(&self) -> Result<Vec<Task>, BackendError>;
}
