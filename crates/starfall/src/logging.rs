//! File logging. The terminal belongs to the UI, so nothing is logged to stdout.

use std::fs;
use std::path::PathBuf;

use color_eyre::eyre::{WrapErr, eyre};
use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Directory receiving the daily log files.
pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "starfall").map(|dirs| dirs.data_local_dir().join("logs"))
}

/// Install a daily-rotated file subscriber. `RUST_LOG` overrides `level`.
///
/// Returns `None` when the platform has no data directory; logging is then
/// disabled. The guard must be kept alive for buffered lines to be flushed.
pub fn init(level: &str) -> color_eyre::Result<Option<WorkerGuard>> {
    let Some(dir) = log_dir() else {
        return Ok(None);
    };
    fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, "starfall.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log filter {level:?}"))?;

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| eyre!(err))?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(Some(guard))
}
