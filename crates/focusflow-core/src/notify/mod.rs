//! User-facing notifications and the session completion notifier.
//!
//! Notifications are fire-and-forget: a sink never reports failure back to
//! the timer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::backend::{NewFocusSession, SessionLogger};

pub const SESSION_LOGGED: &str = "Focus session logged! Time for a break.";
pub const SESSION_LOG_FAILED: &str = "Failed to log session.";
pub const BREAK_OVER: &str = "Break's over! Ready for another focus session?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Destination for transient user messages.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(text = %notification.message, "notification")
            }
            NotificationLevel::Error => warn!(text = %notification.message, "notification"),
        }
    }
}

/// Forwards notifications over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // A closed receiver just means nobody is listening anymore.
        let _ = self.tx.send(notification);
    }
}

/// Hands completed focus sessions to the session log and reports the outcome.
#[derive(Clone)]
pub struct SessionNotifier {
    logger: Arc<dyn SessionLogger>,
    sink: Arc<dyn NotificationSink>,
    in_flight: TaskTracker,
}

impl SessionNotifier {
    pub fn new(logger: Arc<dyn SessionLogger>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            logger,
            sink,
            in_flight: TaskTracker::new(),
        }
    }

    pub fn sink(&self) -> &Arc<dyn NotificationSink> {
        &self.sink
    }

    /// Log `session` on a tracked background task.
    ///
    /// The returned handle may be ignored; failures are reported to the sink
    /// and otherwise swallowed. There is no retry.
    pub fn notify(&self, session: NewFocusSession) -> JoinHandle<()> {
        let logger = Arc::clone(&self.logger);
        let sink = Arc::clone(&self.sink);
        self.in_flight.spawn(async move {
            match logger.log_session(session.clone()).await {
                Ok(record) => {
                    info!(
                        logger = logger.name(),
                        id = record.id,
                        minutes = record.duration_minutes,
                        "focus session logged"
                    );
                    sink.notify(Notification::success(SESSION_LOGGED));
                }
                Err(e) => {
                    error!(
                        logger = logger.name(),
                        minutes = session.duration_minutes,
                        error = %e,
                        "failed to log focus session"
                    );
                    sink.notify(Notification::error(SESSION_LOG_FAILED));
                }
            }
        })
    }

    /// Wait for every log call started so far to finish.
    pub async fn drain(&self) {
        self.in_flight.close();
        self.in_flight.wait().await;
    }
}
