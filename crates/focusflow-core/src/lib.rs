//! # FocusFlow Core Library
//!
//! Business logic for the FocusFlow focus timer. The `focusflow` CLI is a thin
//! layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a pure state machine ([`FocusTimer`]) driven by tick messages,
//!   plus an actor ([`TimerRuntime`]) that owns it and the 1 s tick source
//! - **Storage**: SQLite for sessions and the timer settings, TOML for
//!   application configuration
//! - **Backend**: session logging and task lookup against a hosted
//!   Supabase project, or the local database when offline
//! - **Notify**: user-facing notices about logging outcomes
//!
//! ## Key Components
//!
//! - [`FocusTimer`]: interval countdown and focus/break cycle
//! - [`SettingsStore`]: validated timer duration persistence
//! - [`SessionLogger`]: seam for recording completed focus intervals
//! - [`Config`]: application configuration management

pub mod backend;
pub mod error;
pub mod events;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod timer;

pub use backend::{
    CachedTaskSource, FocusSessionRecord, LocalSessionLog, MirroredSessionLog, NewFocusSession,
    SessionLogger, SessionType, SupabaseClient, Task, TaskId, TaskSource,
};
pub use error::{
    BackendError, ConfigError, CoreError, DatabaseError, LoggingError, PersistenceError,
    ValidationError,
};
pub use events::Event;
pub use notify::{Notification, NotificationLevel, NotificationSink, SessionNotifier};
pub use storage::{Config, Database, SettingsStore};
pub use timer::{DurationSettings, FocusTimer, TimerHandle, TimerMode, TimerRuntime, TimerState};
