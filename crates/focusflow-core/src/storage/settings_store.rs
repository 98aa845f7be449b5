//! Durable storage for the three timer durations.
//!
//! Each duration is its own scalar entry in a key-value store. Reads never
//! fail: anything missing, unreadable or out of range falls back to its
//! default. Writes are validated first and then land in one transaction.

use tracing::warn;

use super::database::Database;
use crate::error::{CoreError, DatabaseError, DurationField, PersistenceError};
use crate::timer::DurationSettings;

pub const FOCUS_KEY: &str = "timer.focus_minutes";
pub const SHORT_BREAK_KEY: &str = "timer.short_break_minutes";
pub const LONG_BREAK_KEY: &str = "timer.long_break_minutes";

pub const SETTINGS_KEYS: [&str; 3] = [FOCUS_KEY, SHORT_BREAK_KEY, LONG_BREAK_KEY];

fn key_for(field: DurationField) -> &'static str {
    match field {
        DurationField::Focus => FOCUS_KEY,
        DurationField::ShortBreak => SHORT_BREAK_KEY,
        DurationField::LongBreak => LONG_BREAK_KEY,
    }
}

/// Minimal key-value contract the settings store needs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Write every entry, or none of them.
    fn set_all(&self, entries: &[(&str, String)]) -> Result<(), DatabaseError>;

    fn remove_all(&self, keys: &[&str]) -> Result<(), DatabaseError>;
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        self.kv_get(key)
    }

    fn set_all(&self, entries: &[(&str, String)]) -> Result<(), DatabaseError> {
        self.kv_set_many(entries)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), DatabaseError> {
        self.kv_delete_many(keys)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        (**self).get(key)
    }

    fn set_all(&self, entries: &[(&str, String)]) -> Result<(), DatabaseError> {
        (**self).set_all(entries)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), DatabaseError> {
        (**self).remove_all(keys)
    }
}

pub struct SettingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the stored durations, substituting defaults field by field.
    ///
    /// A store that cannot be read at all yields the full default set.
    pub fn load(&self) -> DurationSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "falling back to default timer settings");
                DurationSettings::default()
            }
        }
    }

    /// Like [`load`](Self::load) but reports storage failures.
    pub fn try_load(&self) -> Result<DurationSettings, PersistenceError> {
        let mut settings = DurationSettings::default();
        for field in DurationField::ALL {
            let key = key_for(field);
            let raw = self.store.get(key).map_err(PersistenceError::Read)?;
            if let Some(minutes) = raw.as_deref().and_then(|raw| parse_minutes(field, raw)) {
                settings.set(field, minutes);
            }
        }
        Ok(settings)
    }

    /// Validate and persist `settings`.
    ///
    /// # Errors
    /// `CoreError::Validation` lists every out-of-bounds field and nothing is
    /// written. `CoreError::Persistence` means the write was rolled back.
    pub fn save(&self, settings: DurationSettings) -> Result<DurationSettings, CoreError> {
        settings.validate()?;
        let entries: Vec<(&str, String)> = DurationField::ALL
            .iter()
            .map(|&field| (key_for(field), settings.get(field).to_string()))
            .collect();
        self.store
            .set_all(&entries)
            .map_err(PersistenceError::Write)?;
        Ok(settings)
    }

    /// Forget the stored durations so the defaults apply again.
    pub fn reset(&self) -> Result<DurationSettings, PersistenceError> {
        self.store
            .remove_all(&SETTINGS_KEYS)
            .map_err(PersistenceError::Write)?;
        Ok(DurationSettings::default())
    }
}

fn parse_minutes(field: DurationField, raw: &str) -> Option<u32> {
    let minutes = match raw.trim().parse::<u32>() {
        Ok(minutes) => minutes,
        Err(_) => {
            warn!(field = %field, raw, "ignoring non-numeric stored duration");
            return None;
        }
    };
    if field.bounds().contains(minutes) {
        Some(minutes)
    } else {
        warn!(field = %field, minutes, "ignoring out-of-range stored duration");
        None
    }
}
