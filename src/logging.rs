//! Logging setup. The terminal belongs to the panel, so logs go to a file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_DIR: &str = "courtside";
const LOG_FILE: &str = "courtside.log";

/// Installs the global subscriber. Level is controlled by `COURTSIDE_LOG`,
/// e.g. `COURTSIDE_LOG=debug`.
pub fn init() -> Result<PathBuf> {
    let log_dir = log_directory();
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("create log dir {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE);
    let env_filter = EnvFilter::try_from_env("COURTSIDE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("courtside=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .context("install tracing subscriber")?;

    tracing::info!(dir = %log_dir.display(), "courtside starting");
    Ok(log_dir)
}

fn log_directory() -> PathBuf {
    if let Ok(base) = std::env::var("XDG_STATE_HOME")
        && !base.trim().is_empty()
    {
        return PathBuf::from(base).join(LOG_DIR).join("logs");
    }
    match std::env::var("HOME") {
        Ok(home) if !home.trim().is_empty() => PathBuf::from(home)
            .join(".local")
            .join("state")
            .join(LOG_DIR)
            .join("logs"),
        _ => PathBuf::from("logs"),
    }
}
