mod config;
pub mod database;
mod settings_store;

pub use config::{BackendConfig, Config, LoggingConfig, NotificationsConfig, TasksConfig};
pub use database::{DailyFocus, Database, Stats};
pub use settings_store::{KeyValueStore, SettingsStore, SETTINGS_KEYS};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the FocusFlow data directory, creating it if needed.
///
/// `FOCUSFLOW_HOME` wins when set. Otherwise this is `~/.config/focusflow`,
/// or `~/.config/focusflow-dev` when `FOCUSFLOW_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSFLOW_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusflow-dev")
            } else {
                base_dir.join("focusflow")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
