//! Core error types for focusflow-core.
//!
//! Every failure the core can report is modelled here with thiserror.
//! None of them are fatal: callers recover at the boundary where the
//! error is detected and surface it as a notification.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Settings storage could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A focus session could not be logged
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Remote backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The data directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// One of the three configurable durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationField {
    Focus,
    ShortBreak,
    LongBreak,
}

impl DurationField {
    pub const ALL: [DurationField; 3] = [
        DurationField::Focus,
        DurationField::ShortBreak,
        DurationField::LongBreak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationField::Focus => "focus",
            DurationField::ShortBreak => "short_break",
            DurationField::LongBreak => "long_break",
        }
    }
}

impl fmt::Display for DurationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single duration that fell outside its allowed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: DurationField,
    pub value: u32,
    pub min: u32,
    pub max: u32,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} must be between {} and {} minutes (got {})",
            self.field, self.min, self.max, self.value
        )
    }
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// One or more durations are out of bounds
    #[error("{}", join_violations(.0))]
    Durations(Vec<FieldViolation>),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Fields rejected by a duration validation, in declaration order.
    pub fn fields(&self) -> Vec<DurationField> {
        match self {
            ValidationError::Durations(violations) => {
                violations.iter().map(|v| v.field).collect()
            }
            ValidationError::InvalidValue { .. } => Vec::new(),
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Settings storage failures.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read settings: {0}")]
    Read(#[source] DatabaseError),

    #[error("Failed to write settings: {0}")]
    Write(#[source] DatabaseError),
}

/// Failures talking to the hosted backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Backend URL or key missing from config
    #[error("Backend is not configured: {0}")]
    NotConfigured(String),

    /// Request never produced a response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Failures while logging a completed focus session.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Local session log failed: {0}")]
    Local(#[from] DatabaseError),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_violation_message_names_every_field() {
        let err = ValidationError::Durations(vec![
            FieldViolation {
                field: DurationField::Focus,
                value: 0,
                min: 1,
                max: 120,
            },
            FieldViolation {
                field: DurationField::LongBreak,
                value: 90,
                min: 1,
                max: 60,
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("focus must be between 1 and 120 minutes (got 0)"));
        assert!(msg.contains("long_break"));
        assert_eq!(err.fields(), vec![DurationField::Focus, DurationField::LongBreak]);
    }

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }
}
