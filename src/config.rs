use crate::logger::LoggerConfig;
use clap::Parser;
use std::path::PathBuf;

/// Command line options, each with an environment fallback.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskboard",
    version,
    about = "Terminal Kanban board backed by a task REST API"
)]
pub struct Config {
    /// Base URL of the task API; requests go to `<base-url>/tasks`.
    #[arg(long, env = "TASKBOARD_API_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Where logs are written. The terminal itself belongs to the board.
    #[arg(long, env = "TASKBOARD_LOG_FILE", default_value = "taskboard.log")]
    pub log_file: PathBuf,

    /// tracing filter directive, e.g. `debug` or `taskboard=trace`.
    #[arg(long, env = "TASKBOARD_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn logger(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.log_level.clone(),
            file: self.log_file.clone(),
        }
    }
}
