use chrono::Utc;
use clap::Subcommand;
use focusflow_core::stats;
use focusflow_core::storage::Database;
use serde_json::json;

use super::CliResult;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// All-time stats
    All,
    /// Focus minutes per day
    History {
        /// Number of days, ending today (1-3650)
        #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..=3650))]
        days: u32,
    },
    /// Consecutive days with a focus session
    Streak,
}

pub fn run(action: StatsAction) -> CliResult {
    let db = Database::open()?;
    let today = Utc::now().date_naive();

    match action {
        StatsAction::Today => {
            let stats = stats::summary(&db, today)?;
            let out = json!({
                "date": today,
                "sessions": stats.today_sessions,
                "focus_minutes": stats.today_focus_min,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        StatsAction::All => {
            let stats = stats::summary(&db, today)?;
            let out = json!({
                "sessions": stats.total_sessions,
                "focus_minutes": stats.total_focus_min,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        StatsAction::History { days } => {
            let history = stats::history(&db, today, days)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        StatsAction::Streak => {
            let streak = stats::streak(&db, today)?;
            println!("{}", serde_json::to_string_pretty(&streak)?);
        }
    }
    Ok(())
}
