//! Logging setup.
//!
//! The terminal UI owns stdout, so events go to a single file in the
//! configured log directory. Filter comes from `AppConfig::log_filter`.

use std::path::PathBuf;
use std::sync::OnceLock;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

use crate::config::{AppConfig, ConfigError};

pub const LOG_FILE_NAME: &str = "grade-calculator.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error(transparent)]
    Dirs(#[from] ConfigError),

    #[error("Invalid log filter {filter:?}: {source}")]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber. Returns the log file path.
///
/// The filter is always checked. Past that, later calls are no-ops. Errors
/// are returned so the caller can keep running without logs.
pub fn init(config: &AppConfig) -> Result<PathBuf, LoggingError> {
    let filter = EnvFilter::try_new(&config.log_filter).map_err(|source| LoggingError::Filter {
        filter: config.log_filter.clone(),
        source,
    })?;

    let log_path = config.log_dir.join(LOG_FILE_NAME);
    if LOG_GUARD.get().is_some() {
        return Ok(log_path);
    }

    config.ensure_dirs()?;

    let appender = tracing_appender::rolling::never(&config.log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(writer));
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!("Logging initialized; log file at {}", log_path.display());
    Ok(log_path)
}
