//! Focus statistics over the local session log.

mod streak;

pub use streak::{current_streak, longest_streak};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DatabaseError;
use crate::storage::{DailyFocus, Database, Stats};

#[derive(Debug, Clone, Serialize)]
pub struct StreakReport {
    pub current_days: u32,
    pub longest_days: u32,
    pub last_session: Option<NaiveDate>,
}

/// Totals for `today` and all time.
pub fn summary(db: &Database, today: NaiveDate) -> Result<Stats, DatabaseError> {
    db.stats_on(today)
}

/// Zero-filled daily focus minutes for the `days` days ending at `today`.
pub fn history(db: &Database, today: NaiveDate, days: u32) -> Result<Vec<DailyFocus>, DatabaseError> {
    db.focus_by_day(today, days)
}

pub fn streak(db: &Database, today: NaiveDate) -> Result<StreakReport, DatabaseError> {
    let dates = db.focus_dates()?;
    Ok(StreakReport {
        current_days: current_streak(&dates, today),
        longest_days: longest_streak(&dates),
        last_session: dates.iter().copied().filter(|d| *d <= today).max(),
    })
}
