use std::path::Path;

use tracing::Level;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};

/// Environment variable holding the log level (`error`, `warn`, `info`, `debug` or `trace`).
pub const LOG_LEVEL_ENV: &str = "MAZEWALK_LOG";
pub const LOG_FILE_NAME: &str = "mazewalk.log";

fn parse_level(value: Option<&str>) -> Level {
    value
        .and_then(|v| v.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

fn level_from_env() -> Level {
    parse_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
}

/// Sends logs to a file in `log_dir`, keeping them off the terminal the maze is drawn on.
/// Logs are flushed until the returned guard is dropped.
/// Fails if the log file cannot be created in `log_dir`.
pub fn init_file(log_dir: &Path) -> std::io::Result<WorkerGuard> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(log_dir)
        .map_err(std::io::Error::other)?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_max_level(level_from_env())
        .init();
    Ok(guard)
}

/// Sends logs to stderr, for headless runs.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level_from_env())
        .init();
}
