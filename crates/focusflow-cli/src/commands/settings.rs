use clap::Subcommand;
use focusflow_core::storage::{Database, SettingsStore};

use super::CliResult;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the timer durations as JSON
    Show,
    /// Change one or more durations (minutes)
    Set {
        /// Focus length, 1-120
        #[arg(long)]
        focus: Option<u32>,
        /// Short break length, 1-30
        #[arg(long)]
        short_break: Option<u32>,
        /// Long break length, 1-60
        #[arg(long)]
        long_break: Option<u32>,
    },
    /// Restore the default durations
    Reset,
}

pub fn run(action: SettingsAction) -> CliResult {
    let db = Database::open()?;
    let store = SettingsStore::new(&db);

    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&store.load())?);
        }
        SettingsAction::Set {
            focus,
            short_break,
            long_break,
        } => {
            let mut settings = store.load();
            if let Some(minutes) = focus {
                settings.focus_minutes = minutes;
            }
            if let Some(minutes) = short_break {
                settings.short_break_minutes = minutes;
            }
            if let Some(minutes) = long_break {
                settings.long_break_minutes = minutes;
            }
            let saved = store.save(settings)?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        SettingsAction::Reset => {
            let settings = store.reset()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}
