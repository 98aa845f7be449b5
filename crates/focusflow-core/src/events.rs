use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::{NewFocusSession, TaskId};
use crate::timer::{DurationSettings, TickSourceId, TimerMode};

/// Every state change of the focus timer produces an Event.
/// The CLI renders them; the runtime forwards them to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u32,
        source: TickSourceId,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: TimerMode,
        to: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TaskLinked {
        task_id: Option<TaskId>,
        at: DateTime<Utc>,
    },
    /// New durations were accepted. `deferred` is true when a running
    /// interval keeps its old length until the next reset or switch.
    SettingsApplied {
        settings: DurationSettings,
        deferred: bool,
        at: DateTime<Utc>,
    },
    /// An interval ran down to zero and the timer moved on to `next_mode`.
    /// `session` is set only for finished focus intervals.
    IntervalCompleted {
        mode: TimerMode,
        next_mode: TimerMode,
        completed_focus_count: u32,
        session: Option<NewFocusSession>,
        at: DateTime<Utc>,
    },
}
