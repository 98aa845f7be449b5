pub mod config;
pub mod settings;
pub mod stats;
pub mod tasks;
pub mod timer;

use std::sync::Arc;
use std::time::Duration;

use focusflow_core::backend::{
    CachedTaskSource, LocalSessionLog, MirroredSessionLog, SessionLogger, SupabaseClient,
};
use focusflow_core::storage::Database;
use focusflow_core::Config;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// Session log for this run: the hosted backend mirrored into the local
/// database when configured, otherwise the local database alone.
pub fn session_logger(config: &Config) -> Result<Arc<dyn SessionLogger>, Box<dyn std::error::Error>> {
    let local = LocalSessionLog::new(Database::open()?);
    if config.backend.is_remote() {
        let remote = SupabaseClient::from_config(&config.backend)?;
        Ok(Arc::new(MirroredSessionLog::new(remote, local)))
    } else {
        Ok(Arc::new(local))
    }
}

/// Task source backed by the hosted project, or `None` when offline.
pub fn task_source(
    config: &Config,
) -> Result<Option<CachedTaskSource<SupabaseClient>>, Box<dyn std::error::Error>> {
    if !config.backend.is_remote() {
        return Ok(None);
    }
    let client = SupabaseClient::from_config(&config.backend)?;
    Ok(Some(CachedTaskSource::new(
        client,
        Duration::from_secs(config.tasks.cache_ttl_secs),
    )))
}
