use anyhow::Result;
use std::fs;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "PROMPT_GALLERY_LOG";

pub const LOG_FILE: &str = "prompt-gallery.log";

/// Initialize logging subsystem
/// - File logging: Always enabled, writes to <config dir>/prompt-gallery/logs/
/// - Terminal logging: Only with PROMPT_GALLERY_LOG env var or --verbose flag
pub fn init(verbose: bool) -> Result<()> {
    let log_dir = log_dir()?;

    // Ensure log directory exists
    fs::create_dir_all(&log_dir)?;

    // Rolling file appender - new file daily
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE);

    // File layer - always debug level
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(EnvFilter::new("debug"));

    // Terminal layer - only if verbose or PROMPT_GALLERY_LOG is set
    let terminal_layer = if verbose || std::env::var(LOG_ENV).is_ok() {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        Some(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(terminal_layer)
        .try_init()?;

    Ok(())
}

/// Get the log directory path
pub fn log_dir() -> Result<std::path::PathBuf> {
    Ok(crate::config::config_dir()?.join("logs"))
}
