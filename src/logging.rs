//! File-based tracing output. The terminal belongs to the TUI, so nothing
//! is logged to stdout or stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const APP_NAME: &str = "cfind";
const LOG_FILE_NAME: &str = "cfind.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    #[error("failed to open log file at {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: InitError,
    },

    #[error("tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

pub fn default_log_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.data_local_dir().join(APP_NAME).join(LOG_FILE_NAME))
}

/// Install the global subscriber writing to `log_path`. Honors `RUST_LOG`,
/// defaulting to `info`.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let directory = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    let file_name = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|source| LoggingError::FileOpen {
            path: log_path.to_path_buf(),
            source,
        })?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}
