//! Focus timer state machine.
//!
//! The engine is tick-driven and has no internal thread. Whoever owns it
//! (normally [`super::TimerRuntime`]) delivers one `tick()` per second while
//! it is running.
//!
//! ## Modes
//!
//! ```text
//! Focus -> ShortBreak -> Focus -> ShortBreak -> ... -> Focus -> LongBreak -> Focus
//! ```
//!
//! Every fourth completed focus interval is followed by a long break.
//!
//! ## Tick sources
//!
//! Each `start()` arms a fresh [`TickSourceId`]. A tick is only counted when
//! it carries the id that is currently armed, so ticks from a source that was
//! cancelled by `pause()`, `reset()` or `switch_mode()` never reach the new
//! countdown.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = FocusTimer::new(DurationSettings::default());
//! timer.start();
//! let source = timer.active_source().unwrap();
//! // Once per second:
//! if let Some(Event::IntervalCompleted { session, .. }) = timer.tick(source) {
//!     // hand `session` to the session notifier
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::schedule::{DurationSettings, TimerMode};
use crate::backend::{NewFocusSession, TaskId};
use crate::events::Event;

/// Identity of one armed tick source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickSourceId(u64);

impl TickSourceId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Point-in-time view of the timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_secs: u32,
    /// Length of the armed interval.
    pub total_secs: u32,
    pub is_running: bool,
    pub completed_focus_count: u32,
    pub linked_task_id: Option<TaskId>,
}

impl TimerState {
    /// 0.0 .. 100.0 progress within the current interval.
    pub fn progress_pct(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        let elapsed = self.total_secs.saturating_sub(self.remaining_secs);
        f64::from(elapsed) / f64::from(self.total_secs) * 100.0
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

#[derive(Debug, Clone)]
pub struct FocusTimer {
    settings: DurationSettings,
    mode: TimerMode,
    remaining_secs: u32,
    /// Minutes the current interval was armed with. Settings saved while the
    /// interval runs do not change it.
    armed_minutes: u32,
    /// Armed tick source; `Some` exactly while running.
    active_source: Option<TickSourceId>,
    sources_issued: u64,
    completed_focus_count: u32,
    linked_task_id: Option<TaskId>,
}

impl FocusTimer {
    /// Create a timer in `Focus` mode, not running, with a full interval.
    pub fn new(settings: DurationSettings) -> Self {
        let armed_minutes = settings.minutes_for(TimerMode::Focus);
        Self {
            settings,
            mode: TimerMode::Focus,
            remaining_secs: settings.seconds_for(TimerMode::Focus),
            armed_minutes,
            active_source: None,
            sources_issued: 0,
            completed_focus_count: 0,
            linked_task_id: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.active_source.is_some()
    }

    pub fn active_source(&self) -> Option<TickSourceId> {
        self.active_source
    }

    pub fn completed_focus_count(&self) -> u32 {
        self.completed_focus_count
    }

    pub fn linked_task_id(&self) -> Option<TaskId> {
        self.linked_task_id
    }

    pub fn settings(&self) -> &DurationSettings {
        &self.settings
    }

    pub fn total_secs(&self) -> u32 {
        self.armed_minutes.saturating_mul(60)
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            is_running: self.is_running(),
            completed_focus_count: self.completed_focus_count,
            linked_task_id: self.linked_task_id,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.is_running() || self.remaining_secs == 0 {
            return None;
        }
        self.sources_issued += 1;
        let source = TickSourceId(self.sources_issued);
        self.active_source = Some(source);
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            source,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.active_source.take()?;
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Re-arm the current mode from the configured durations.
    pub fn reset(&mut self) -> Event {
        self.active_source = None;
        self.arm(self.mode);
        Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    pub fn switch_mode(&mut self, mode: TimerMode) -> Event {
        let from = self.mode;
        self.active_source = None;
        self.arm(mode);
        Event::ModeSwitched {
            from,
            to: mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Link (or unlink) the task credited for the next focus interval.
    ///
    /// Ignored while running.
    pub fn link_task(&mut self, task_id: Option<TaskId>) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        self.linked_task_id = task_id;
        Some(Event::TaskLinked {
            task_id,
            at: Utc::now(),
        })
    }

    /// Adopt new durations. An idle timer re-arms its current mode at once;
    /// a running interval finishes with the length it started with.
    pub fn apply_settings(&mut self, settings: DurationSettings) -> Event {
        self.settings = settings;
        let deferred = self.is_running();
        if !deferred {
            self.arm(self.mode);
        }
        Event::SettingsApplied {
            settings,
            deferred,
            at: Utc::now(),
        }
    }

    /// Count one second from `source`.
    ///
    /// Returns `Some(Event::IntervalCompleted)` when the interval reaches
    /// zero. Ticks from a source other than the armed one are dropped.
    pub fn tick(&mut self, source: TickSourceId) -> Option<Event> {
        if self.active_source != Some(source) {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.complete_interval());
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_interval(&mut self) -> Event {
        self.active_source = None;
        let finished = self.mode;

        let session = if finished == TimerMode::Focus {
            self.completed_focus_count += 1;
            Some(NewFocusSession::focus(self.armed_minutes, self.linked_task_id))
        } else {
            None
        };

        let next_mode = finished.next(self.completed_focus_count);
        self.arm(next_mode);

        Event::IntervalCompleted {
            mode: finished,
            next_mode,
            completed_focus_count: self.completed_focus_count,
            session,
            at: Utc::now(),
        }
    }

    fn arm(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.armed_minutes = self.settings.minutes_for(mode);
        self.remaining_secs = self.settings.seconds_for(mode);
    }
}
