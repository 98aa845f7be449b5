//! Staleness-bounded cache in front of a [`TaskSource`].
//!
//! Reads inside the TTL are served locally. Records returned by the backend
//! after a write go straight into the cache via [`CachedTaskSource::apply`]
//! instead of triggering a refetch.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use super::traits::TaskSource;
use super::types::{Task, TaskId};
use crate::error::BackendError;

struct CacheEntry {
    fetched_at: Instant,
    tasks: Vec<Task>,
}

pub struct CachedTaskSource<S> {
    inner: S,
    ttl: Duration,
    cache: Mutex<Option<CacheEntry>>,
}

impl<S: TaskSource> CachedTaskSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: Mutex::new(None),
        }
    }

    fn fresh(&self) -> Option<Vec<Task>> {
        let cache = self.cache.lock().ok()?;
        let entry = cache.as_ref()?;
        (entry.fetched_at.elapsed() < self.ttl).then(|| entry.tasks.clone())
    }

    /// Merge a server-returned task into the cache.
    ///
    /// Completed tasks drop out of the pending list. Without a cached list
    /// this is a no-op; the next read fetches anyway.
    pub fn apply(&self, task: Task) {
        let Ok(mut cache) = self.cache.lock() else {
            return;
        };
        let Some(entry) = cache.as_mut() else {
            return;
        };
        entry.tasks.retain(|t| t.id != task.id);
        if !task.is_completed {
            entry.tasks.push(task);
            entry.tasks.sort_by_key(|t| (t.created_at, t.id));
        }
    }

    /// Force the next read to go to the backend.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }

    /// Look up a pending task by id.
    pub async fn find(&self, id: TaskId) -> Result<Option<Task>, BackendError> {
        Ok(self.pending_tasks().await?.into_iter().find(|t| t.id == id))
    }
}

#[async_trait]
impl<S: TaskSource> TaskSource for CachedTaskSource<S> {
    async fn pending_tasks(&self) -> Result<Vec<Task>, BackendError> {
        if let Some(tasks) = self.fresh() {
            return Ok(tasks);
        }

        let tasks = self.inner.pending_tasks().await?;
        debug!(count = tasks.len(), "task cache refreshed");
        if let Ok(mut cache) = self.cache.lock() {
            *cache = Some(CacheEntry {
                fetched_at: Instant::now(),
                tasks: tasks.clone(),
            });
        }
        Ok(tasks)
    }
}
