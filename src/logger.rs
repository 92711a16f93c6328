use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: String,
    pub file: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Logger has been already initialized")]
    AlreadyInitialized,
}

/// Installs the global subscriber, appending plain-text lines to `cfg.file`.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_new(&cfg.level)
        .map_err(|e| LoggerError::InvalidLogLevel(format!("{} ({})", cfg.level, e)))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.file)
        .map_err(|source| LoggerError::OpenFile {
            path: cfg.file.clone(),
            source,
        })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}
