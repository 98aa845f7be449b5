use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DurationField, FieldViolation, ValidationError};

/// Completed focus intervals between long breaks.
pub const FOCUS_INTERVALS_PER_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short_break",
            TimerMode::LongBreak => "long_break",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    /// Mode that follows a completed interval of this mode.
    ///
    /// `completed_focus_count` must already include the interval that just
    /// finished when `self` is `Focus`.
    pub fn next(&self, completed_focus_count: u32) -> TimerMode {
        match self {
            TimerMode::Focus => {
                if completed_focus_count > 0
                    && completed_focus_count % FOCUS_INTERVALS_PER_LONG_BREAK == 0
                {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" | "pomodoro" | "f" => Ok(TimerMode::Focus),
            "short_break" | "short" | "s" => Ok(TimerMode::ShortBreak),
            "long_break" | "long" | "l" => Ok(TimerMode::LongBreak),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("unknown timer mode '{other}'"),
            }),
        }
    }
}

/// Inclusive minute bounds for one duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub fn contains(&self, minutes: u32) -> bool {
        (self.min..=self.max).contains(&minutes)
    }
}

impl DurationField {
    pub fn bounds(&self) -> Bounds {
        match self {
            DurationField::Focus => Bounds { min: 1, max: 120 },
            DurationField::ShortBreak => Bounds { min: 1, max: 30 },
            DurationField::LongBreak => Bounds { min: 1, max: 60 },
        }
    }

    pub fn default_minutes(&self) -> u32 {
        match self {
            DurationField::Focus => 25,
            DurationField::ShortBreak => 5,
            DurationField::LongBreak => 15,
        }
    }
}

/// User-configured interval lengths, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSettings {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
}

impl Default for DurationSettings {
    fn default() -> Self {
        Self {
            focus_minutes: DurationField::Focus.default_minutes(),
            short_break_minutes: DurationField::ShortBreak.default_minutes(),
            long_break_minutes: DurationField::LongBreak.default_minutes(),
        }
    }
}

impl DurationSettings {
    pub fn new(focus_minutes: u32, short_break_minutes: u32, long_break_minutes: u32) -> Self {
        Self {
            focus_minutes,
            short_break_minutes,
            long_break_minutes,
        }
    }

    pub fn get(&self, field: DurationField) -> u32 {
        match field {
            DurationField::Focus => self.focus_minutes,
            DurationField::ShortBreak => self.short_break_minutes,
            DurationField::LongBreak => self.long_break_minutes,
        }
    }

    pub fn set(&mut self, field: DurationField, minutes: u32) {
        match field {
            DurationField::Focus => self.focus_minutes = minutes,
            DurationField::ShortBreak => self.short_break_minutes = minutes,
            DurationField::LongBreak => self.long_break_minutes = minutes,
        }
    }

    pub fn minutes_for(&self, mode: TimerMode) -> u32 {
        self.get(field_for(mode))
    }

    /// Duration of `mode` in seconds.
    pub fn seconds_for(&self, mode: TimerMode) -> u32 {
        self.minutes_for(mode).saturating_mul(60)
    }

    /// Check every field against its bounds, collecting all violations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let violations: Vec<FieldViolation> = DurationField::ALL
            .iter()
            .filter_map(|&field| {
                let value = self.get(field);
                let bounds = field.bounds();
                (!bounds.contains(value)).then_some(FieldViolation {
                    field,
                    value,
                    min: bounds.min,
                    max: bounds.max,
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Durations(violations))
        }
    }
}

fn field_for(mode: TimerMode) -> DurationField {
    match mode {
        TimerMode::Focus => DurationField::Focus,
        TimerMode::ShortBreak => DurationField::ShortBreak,
        TimerMode::LongBreak => DurationField::LongBreak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_25_5_15() {
        let s = DurationSettings::default();
        assert_eq!(s.seconds_for(TimerMode::Focus), 1500);
        assert_eq!(s.seconds_for(TimerMode::ShortBreak), 300);
        assert_eq!(s.seconds_for(TimerMode::LongBreak), 900);
    }

    #[test]
    fn every_fourth_focus_earns_long_break() {
        let expected = [
            (1, TimerMode::ShortBreak),
            (2, TimerMode::ShortBreak),
            (3, TimerMode::ShortBreak),
            (4, TimerMode::LongBreak),
            (5, TimerMode::ShortBreak),
            (8, TimerMode::LongBreak),
        ];
        for (count, mode) in expected {
            assert_eq!(TimerMode::Focus.next(count), mode, "count {count}");
        }
        assert_eq!(TimerMode::ShortBreak.next(3), TimerMode::Focus);
        assert_eq!(TimerMode::LongBreak.next(4), TimerMode::Focus);
    }

    #[test]
    fn validate_reports_all_offending_fields() {
        let err = DurationSettings::new(0, 31, 15).validate().unwrap_err();
        assert_eq!(
            err.fields(),
            vec![DurationField::Focus, DurationField::ShortBreak]
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(DurationSettings::new(1, 1, 1).validate().is_ok());
        assert!(DurationSettings::new(120, 30, 60).validate().is_ok());
        assert!(DurationSettings::new(121, 30, 60).validate().is_err());
        assert!(DurationSettings::new(120, 30, 61).validate().is_err());
    }

    #[test]
    fn mode_parses_short_names() {
        assert_eq!("f".parse::<TimerMode>().unwrap(), TimerMode::Focus);
        assert_eq!("Short_Break".parse::<TimerMode>().unwrap(), TimerMode::ShortBreak);
        assert_eq!("long".parse::<TimerMode>().unwrap(), TimerMode::LongBreak);
        assert!("nap".parse::<TimerMode>().is_err());
    }
}
