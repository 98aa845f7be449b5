//! Async owner of a [`FocusTimer`].
//!
//! The runtime is a single task that serialises user commands and ticks onto
//! one engine. It keeps at most one [`Ticker`] alive and replaces or drops it
//! after every message, so the tick source always matches the engine's armed
//! source. Completed focus intervals go to the [`SessionNotifier`] without
//! being awaited; shutdown waits for those log calls before returning.

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::engine::{FocusTimer, TickSourceId, TimerState};
use super::schedule::{DurationSettings, TimerMode};
use super::ticker::{Ticker, TICK_PERIOD};
use crate::backend::TaskId;
use crate::events::Event;
use crate::notify::{Notification, SessionNotifier, BREAK_OVER};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum TimerCommand {
    Start,
    Pause,
    Toggle,
    Reset,
    SwitchMode(TimerMode),
    LinkTask(Option<TaskId>),
    ApplySettings(DurationSettings),
    Shutdown,
}

#[derive(Debug, Error)]
#[error("timer runtime has stopped")]
pub struct RuntimeClosed;

/// Cheap, cloneable front door to a running [`TimerRuntime`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<TimerCommand>,
    state: watch::Receiver<TimerState>,
}

impl TimerHandle {
    pub async fn send(&self, command: TimerCommand) -> Result<(), RuntimeClosed> {
        self.commands.send(command).await.map_err(|_| RuntimeClosed)
    }

    pub async fn start(&self) -> Result<(), RuntimeClosed> {
        self.send(TimerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<(), RuntimeClosed> {
        self.send(TimerCommand::Pause).await
    }

    pub async fn toggle(&self) -> Result<(), RuntimeClosed> {
        self.send(TimerCommand::Toggle).await
    }

    pub async fn reset(&self) -> Result<(), RuntimeClosed> {
        self.send(TimerCommand::Reset).await
    }

    pub async fn switch_mode(&self, mode: TimerMode) -> Result<(), RuntimeClosed> {
        self.send(TimerCommand::SwitchMode(mode)).await
    }

    pub async fn link_task(&self, task_id: Option<TaskId>) -> Result<(), RuntimeClosed> {
        self.send(TimerCommand::LinkTask(task_id)).await
    }

    pub async fn apply_settings(&self, settings: DurationSettings) -> Result<(), RuntimeClosed> {
        self.send(TimerCommand::ApplySettings(settings)).await
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeClosed> {
        self.send(TimerCommand::Shutdown).await
    }

    /// Latest published state.
    pub fn state(&self) -> TimerState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.state.clone()
    }
}

pub struct TimerRuntime {
    timer: FocusTimer,
    notifier: SessionNotifier,
    events: Option<mpsc::UnboundedSender<Event>>,
}

impl TimerRuntime {
    pub fn new(settings: DurationSettings, notifier: SessionNotifier) -> Self {
        Self::from_timer(FocusTimer::new(settings), notifier)
    }

    pub fn from_timer(timer: FocusTimer, notifier: SessionNotifier) -> Self {
        Self {
            timer,
            notifier,
            events: None,
        }
    }

    /// Forward every engine event to `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<Event>) -> Self {
        self.events = Some(events);
        self
    }

    /// Run on a new task.
    ///
    /// The join handle resolves to the final engine once the runtime receives
    /// `Shutdown` or every [`TimerHandle`] is dropped.
    pub fn spawn(self) -> (TimerHandle, JoinHandle<FocusTimer>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(self.timer.state());
        let task = tokio::spawn(self.run(cmd_rx, state_tx));
        (
            TimerHandle {
                commands: cmd_tx,
                state: state_rx,
            },
            task,
        )
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<TimerCommand>,
        state: watch::Sender<TimerState>,
    ) -> FocusTimer {
        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel::<TickSourceId>();
        let mut ticker: Option<Ticker> = None;

        loop {
            let event = tokio::select! {
                command = commands.recv() => match command {
                    None | Some(TimerCommand::Shutdown) => break,
                    Some(command) => self.handle(command),
                },
                Some(source) = tick_rx.recv() => self.timer.tick(source),
            };

            if let Some(event) = event {
                self.dispatch(event);
            }
            ticker = self.sync_ticker(ticker.take(), &tick_tx);
            state.send_replace(self.timer.state());
        }

        drop(ticker);
        if let Some(event) = self.timer.pause() {
            self.dispatch(event);
        }
        state.send_replace(self.timer.state());
        self.notifier.drain().await;
        debug!("timer runtime stopped");
        self.timer
    }

    fn handle(&mut self, command: TimerCommand) -> Option<Event> {
        match command {
            TimerCommand::Start => self.timer.start(),
            TimerCommand::Pause => self.timer.pause(),
            TimerCommand::Toggle => self.timer.toggle(),
            TimerCommand::Reset => Some(self.timer.reset()),
            TimerCommand::SwitchMode(mode) => Some(self.timer.switch_mode(mode)),
            TimerCommand::LinkTask(task_id) => {
                let event = self.timer.link_task(task_id);
                if event.is_none() {
                    debug!(?task_id, "task link ignored while running");
                }
                event
            }
            TimerCommand::ApplySettings(settings) => Some(self.timer.apply_settings(settings)),
            TimerCommand::Shutdown => None,
        }
    }

    /// Keep exactly the ticker the engine expects.
    fn sync_ticker(
        &self,
        current: Option<Ticker>,
        tick_tx: &mpsc::UnboundedSender<TickSourceId>,
    ) -> Option<Ticker> {
        match (self.timer.active_source(), current) {
            (Some(source), Some(ticker)) if ticker.source() == source => Some(ticker),
            (Some(source), _) => Some(Ticker::spawn(source, TICK_PERIOD, tick_tx.clone())),
            (None, _) => None,
        }
    }

    fn dispatch(&self, event: Event) {
        if let Event::IntervalCompleted {
            mode,
            next_mode,
            completed_focus_count,
            session,
            ..
        } = &event
        {
            info!(%mode, %next_mode, completed_focus_count, "interval completed");
            match session {
                Some(session) => {
                    self.notifier.notify(session.clone());
                }
                None => self.notifier.sink().notify(Notification::info(BREAK_OVER)),
            }
        }

        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FocusSessionRecord, NewFocusSession, SessionLogger, SessionType};
    use crate::error::{BackendError, LoggingError};
    use crate::notify::{ChannelSink, NotificationLevel};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingLogger {
        sessions: Mutex<Vec<NewFocusSession>>,
        fail: bool,
        delay: Duration,
    }

    #[async_trait]
    impl SessionLogger for RecordingLogger {
        fn name(&self) -> &str {
            "recording"
        }

        async fn log_session(
            &self,
            session: NewFocusSession,
        ) -> Result<FocusSessionRecord, LoggingError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.sessions.lock().unwrap().push(session.clone());
            if self.fail {
                return Err(BackendError::Decode("boom".into()).into());
            }
            Ok(FocusSessionRecord {
                id: 1,
                user_id: None,
                duration_minutes: session.duration_minutes,
                session_type: SessionType::Focus,
                task_id: session.task_id,
                completed_at: Utc::now(),
            })
        }
    }

    fn runtime(
        settings: DurationSettings,
        logger: Arc<RecordingLogger>,
    ) -> (
        TimerHandle,
        JoinHandle<FocusTimer>,
        mpsc::UnboundedReceiver<Notification>,
    ) {
        let (sink, notes) = ChannelSink::new();
        let notifier = SessionNotifier::new(logger, Arc::new(sink));
        let (handle, task) = TimerRuntime::new(settings, notifier).spawn();
        (handle, task, notes)
    }

    async fn wait_for_mode(handle: &TimerHandle, mode: TimerMode) {
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.mode == mode).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn default_focus_interval_runs_into_short_break() {
        let logger = Arc::new(RecordingLogger::default());
        let (handle, _task, mut notes) = runtime(DurationSettings::default(), logger.clone());

        handle.start().await.unwrap();
        wait_for_mode(&handle, TimerMode::ShortBreak).await;

        let state = handle.state();
        assert_eq!(state.remaining_secs, 300);
        assert_eq!(state.completed_focus_count, 1);
        assert!(!state.is_running);

        let note = notes.recv().await.unwrap();
        assert_eq!(note.level, NotificationLevel::Success);
        assert_eq!(
            *logger.sessions.lock().unwrap(),
            vec![NewFocusSession::focus(25, None)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_the_countdown() {
        let (handle, _task, _notes) = runtime(
            DurationSettings::default(),
            Arc::new(RecordingLogger::default()),
        );

        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        handle.pause().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        let state = handle.state();
        assert!(!state.is_running);
        assert_eq!(state.remaining_secs, 1490);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_switch_discards_old_ticks() {
        let (handle, _task, _notes) = runtime(
            DurationSettings::default(),
            Arc::new(RecordingLogger::default()),
        );

        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        handle.switch_mode(TimerMode::LongBreak).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;

        let state = handle.state();
        assert_eq!(state.mode, TimerMode::LongBreak);
        assert_eq!(state.remaining_secs, 900);
        assert!(!state.is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn logging_failure_does_not_block_mode_switch() {
        let logger = Arc::new(RecordingLogger {
            fail: true,
            ..Default::default()
        });
        let (handle, _task, mut notes) = runtime(DurationSettings::new(1, 5, 15), logger);

        handle.start().await.unwrap();
        wait_for_mode(&handle, TimerMode::ShortBreak).await;

        let note = notes.recv().await.unwrap();
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(handle.state().completed_focus_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_break_announces_focus() {
        let (handle, _task, mut notes) = runtime(
            DurationSettings::new(1, 1, 1),
            Arc::new(RecordingLogger::default()),
        );

        handle.switch_mode(TimerMode::ShortBreak).await.unwrap();
        handle.start().await.unwrap();
        wait_for_mode(&handle, TimerMode::Focus).await;

        assert_eq!(notes.recv().await, Some(Notification::info(BREAK_OVER)));
        assert_eq!(handle.state().completed_focus_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_ticking_and_returns_engine() {
        let (handle, task, _notes) = runtime(
            DurationSettings::default(),
            Arc::new(RecordingLogger::default()),
        );

        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        handle.shutdown().await.unwrap();

        let timer = task.await.unwrap();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), 1497);
        assert!(handle.start().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_pending_session_log() {
        let logger = Arc::new(RecordingLogger {
            delay: Duration::from_millis(50),
            ..Default::default()
        });
        let (handle, task, _notes) = runtime(DurationSettings::new(1, 5, 15), logger.clone());

        handle.start().await.unwrap();
        wait_for_mode(&handle, TimerMode::ShortBreak).await;
        handle.shutdown().await.unwrap();

        let timer = task.await.unwrap();
        assert_eq!(timer.completed_focus_count(), 1);
        assert_eq!(logger.sessions.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_forwarded() {
        let (sink, _notes) = ChannelSink::new();
        let notifier = SessionNotifier::new(Arc::new(RecordingLogger::default()), Arc::new(sink));
        let (tx, mut events) = mpsc::unbounded_channel();
        let (handle, _task) = TimerRuntime::new(DurationSettings::default(), notifier)
            .with_events(tx)
            .spawn();

        handle.link_task(Some(9)).await.unwrap();
        handle.start().await.unwrap();

        assert!(matches!(
            events.recv().await,
            Some(Event::TaskLinked { task_id: Some(9), .. })
        ));
        assert!(matches!(events.recv().await, Some(Event::TimerStarted { .. })));
    }
}
