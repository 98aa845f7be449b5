//! One-second tick source for a running timer.
//!
//! A [`Ticker`] is a scoped resource: it starts sending ticks when spawned and
//! stops when it is dropped or its receiver goes away. The runtime keeps
//! at most one alive and drops it on every transition out of `running`.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::engine::TickSourceId;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Ticker {
    source: TickSourceId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a background task that sends `source` every `period`.
    ///
    /// The first tick fires one full period after spawning. Must be called
    /// from within a tokio runtime.
    pub fn spawn(
        source: TickSourceId,
        period: Duration,
        sink: mpsc::UnboundedSender<TickSourceId>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        trace!(source = source.get(), "tick source cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        if sink.send(source).is_err() {
                            trace!(source = source.get(), "tick receiver gone");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            source,
            cancel,
            handle,
        }
    }

    pub fn source(&self) -> TickSourceId {
        self.source
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}
