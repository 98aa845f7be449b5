use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Subcommand;
use focusflow_core::backend::{CachedTaskSource, SupabaseClient, TaskId};
use focusflow_core::notify::{ChannelSink, Notification, NotificationLevel, NotificationSink, TracingSink};
use focusflow_core::storage::{Database, SettingsStore};
use focusflow_core::timer::{TimerHandle, TimerMode, TimerRuntime, TimerState};
use focusflow_core::{Config, SessionNotifier};
use tokio::sync::mpsc;
use tracing::debug;

use super::{runtime, session_logger, task_source, CliResult};

const HELP: &str = "commands: p pause/resume | r reset | f focus | s short break | l long break | t <id> link task | q quit";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the countdown in this terminal
    Run {
        /// Task credited for focus sessions
        #[arg(long)]
        task: Option<TaskId>,
        /// Interval to start in (focus, short_break, long_break)
        #[arg(long, default_value = "focus")]
        mode: TimerMode,
    },
}

enum Input {
    Handled,
    Quit,
}

pub fn run(action: TimerAction, config: &Config) -> CliResult {
    match action {
        TimerAction::Run { task, mode } => runtime()?.block_on(run_interactive(config, task, mode)),
    }
}

async fn run_interactive(config: &Config, task: Option<TaskId>, mode: TimerMode) -> CliResult {
    let settings = SettingsStore::new(&Database::open()?).load();
    let tasks = task_source(config)?;

    let (sink, mut notes) = if config.notifications.enabled {
        let (sink, rx) = ChannelSink::new();
        (Arc::new(sink) as Arc<dyn NotificationSink>, Some(rx))
    } else {
        (Arc::new(TracingSink) as Arc<dyn NotificationSink>, None)
    };
    let notifier = SessionNotifier::new(session_logger(config)?, sink);

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (handle, join) = TimerRuntime::new(settings, notifier)
        .with_events(events_tx)
        .spawn();
    if mode != TimerMode::Focus {
        handle.switch_mode(mode).await?;
    }
    if let Some(id) = task {
        link_task(&handle, tasks.as_ref(), id).await?;
    }
    handle.start().await?;

    println!("{HELP}");
    let mut states = handle.subscribe();
    let mut lines = stdin_lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    render(&handle.state());

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                if let Input::Quit = handle_input(&handle, tasks.as_ref(), line.trim()).await? {
                    break;
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                render(&state);
            }
            Some(note) = recv_note(&mut notes) => {
                print_note(&note);
            }
            Some(event) = events.recv() => {
                debug!(?event, "timer event");
            }
            _ = &mut ctrl_c => {
                debug!("interrupted");
                break;
            }
        }
    }

    // Shutting down drops the ticker before the engine is handed back.
    let _ = handle.shutdown().await;
    let timer = join.await?;
    println!();
    println!(
        "stopped in {} with {} left; {} focus interval(s) completed",
        timer.mode().label(),
        timer.state().clock(),
        timer.completed_focus_count()
    );
    Ok(())
}

/// Forward stdin lines from a plain thread.
///
/// A blocking read parked there does not hold up runtime shutdown, so Ctrl-C
/// exits even while the terminal is waiting for input.
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn recv_note(notes: &mut Option<mpsc::UnboundedReceiver<Notification>>) -> Option<Notification> {
    match notes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn handle_input(
    handle: &TimerHandle,
    tasks: Option<&CachedTaskSource<SupabaseClient>>,
    line: &str,
) -> Result<Input, Box<dyn std::error::Error>> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => {}
        Some("p") => handle.toggle().await?,
        Some("r") => handle.reset().await?,
        Some("f") => handle.switch_mode(TimerMode::Focus).await?,
        Some("s") => handle.switch_mode(TimerMode::ShortBreak).await?,
        Some("l") => handle.switch_mode(TimerMode::LongBreak).await?,
        Some("t") => match parts.next() {
            None => handle.link_task(None).await?,
            Some(raw) => match raw.parse::<TaskId>() {
                Ok(id) => link_task(handle, tasks, id).await?,
                Err(_) => println!("\ninvalid task id: {raw}"),
            },
        },
        Some("q") => return Ok(Input::Quit),
        Some(_) => println!("\n{HELP}"),
    }
    Ok(Input::Handled)
}

async fn link_task(
    handle: &TimerHandle,
    tasks: Option<&CachedTaskSource<SupabaseClient>>,
    id: TaskId,
) -> Result<(), Box<dyn std::error::Error>> {
    if handle.state().is_running {
        println!("\npause the timer before changing the linked task");
        return Ok(());
    }
    if let Some(tasks) = tasks {
        match tasks.find(id).await {
            Ok(Some(task)) => println!("\nlinked: {}", task.content),
            Ok(None) => {
                println!("\nno pending task with id {id}");
                return Ok(());
            }
            Err(e) => println!("\ncould not verify task {id}: {e}"),
        }
    }
    handle.link_task(Some(id)).await?;
    Ok(())
}

fn render(state: &TimerState) {
    let status = if state.is_running { "running" } else { "paused" };
    let task = state
        .linked_task_id
        .map(|id| format!(" task #{id}"))
        .unwrap_or_default();
    print!(
        "\r{:<12} {} [{status}] {:>3.0}%{task}    ",
        state.mode.label(),
        state.clock(),
        state.progress_pct()
    );
    let _ = std::io::stdout().flush();
}

fn print_note(note: &Notification) {
    let prefix = match note.level {
        NotificationLevel::Success => "✓",
        NotificationLevel::Info => "•",
        NotificationLevel::Error => "✗",
    };
    println!("\n{prefix} {}", note.message);
}
