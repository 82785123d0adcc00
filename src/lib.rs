//! Lead ledger: a tenant-scoped lead store with a monthly reporting engine
//! covering acquisition funnels, weekly pacing, commissions, billing and a
//! trailing six-month comparison.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

pub mod db;
pub mod engine;
pub mod errors;
pub mod export;
pub mod models;
pub mod tracker;

pub use errors::{AppError, AppResult};
pub use tracker::TrackerCore;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Installs the global JSON tracing subscriber with a daily rolling file
/// under `<app_data_dir>/logs`. Safe to call once per process; later calls
/// fail with the subscriber error.
pub fn init_tracing(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "tracker.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
