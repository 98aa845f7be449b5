//! Integration tests for timer settings persistence.

use focusflow_core::error::{CoreError, ValidationError};
use focusflow_core::storage::{Database, SettingsStore};
use focusflow_core::timer::DurationSettings;
use proptest::prelude::*;

#[test]
fn settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusflow.db");

    {
        let db = Database::open_at(&path).unwrap();
        SettingsStore::new(&db)
            .save(DurationSettings::new(50, 10, 30))
            .unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    assert_eq!(
        SettingsStore::new(&db).load(),
        DurationSettings::new(50, 10, 30)
    );
}

#[test]
fn every_violation_is_reported() {
    let db = Database::open_memory().unwrap();
    let err = SettingsStore::new(&db)
        .save(DurationSettings::new(0, 31, 61))
        .unwrap_err();

    match err {
        CoreError::Validation(e @ ValidationError::Durations(_)) => {
            assert_eq!(e.fields().len(), 3);
            let message = e.to_string();
            assert!(message.contains("focus must be between 1 and 120 minutes"));
            assert!(message.contains("short_break must be between 1 and 30 minutes"));
            assert!(message.contains("long_break must be between 1 and 60 minutes"));
        }
        other => panic!("Expected validation error, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn valid_settings_round_trip(focus in 1u32..=120, short in 1u32..=30, long in 1u32..=60) {
        let db = Database::open_memory().unwrap();
        let store = SettingsStore::new(&db);
        let settings = DurationSettings::new(focus, short, long);
        prop_assert_eq!(store.save(settings).unwrap(), settings);
        prop_assert_eq!(store.load(), settings);
    }

    #[test]
    fn out_of_bounds_save_changes_nothing(focus in 121u32..1000, short in 0u32..=30) {
        let db = Database::open_memory().unwrap();
        let store = SettingsStore::new(&db);
        let saved = DurationSettings::new(40, 8, 20);
        store.save(saved).unwrap();

        prop_assert!(store.save(DurationSettings::new(focus, short, 15)).is_err());
        prop_assert_eq!(store.load(), saved);
    }
}
