//! Records exchanged with the hosted backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend row id of a task.
pub type TaskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Focus,
    DeepWork,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Focus => "focus",
            SessionType::DeepWork => "deep_work",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed interval waiting to be written to the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFocusSession {
    pub duration_minutes: u32,
    pub session_type: SessionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
}

impl NewFocusSession {
    pub fn focus(duration_minutes: u32, task_id: Option<TaskId>) -> Self {
        Self {
            duration_minutes,
            session_type: SessionType::Focus,
            task_id,
        }
    }
}

/// A session row as stored by the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSessionRecord {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<String>,
    pub duration_minutes: u32,
    pub session_type: SessionType,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub content: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub goal_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
