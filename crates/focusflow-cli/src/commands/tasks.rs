use clap::Subcommand;
use focusflow_core::backend::TaskSource;
use focusflow_core::Config;

use super::{runtime, task_source, CliResult};

#[derive(Subcommand)]
pub enum TasksAction {
    /// List incomplete tasks, oldest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TasksAction, config: &Config) -> CliResult {
    let Some(source) = task_source(config)? else {
        return Err("no backend configured; set backend.url and backend.anon_key".into());
    };

    match action {
        TasksAction::List { json } => {
            let tasks = runtime()?.block_on(source.pending_tasks())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No pending tasks.");
            } else {
                for task in &tasks {
                    println!("{:>6}  {}", task.id, task.content);
                }
            }
        }
    }
    Ok(())
}
