//! Logging setup using the tracing ecosystem.
//!
//! Widgets in this crate emit `tracing` events (superseded fetches at
//! debug, suggestion failures at warn). Host applications that want them
//! on disk can call [`init`], which configures a daily-rotating file
//! appender. TUIs must not log to the terminal they are drawing on.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log filter if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "lazygrid=info,warn";

/// Initialize file-based logging for a host application.
///
/// Logs land in the platform local data directory under `lazygrid/logs/`,
/// rotated daily. The level is configurable via `RUST_LOG`, e.g.
/// `RUST_LOG=lazygrid=debug` to see superseded-request drops.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    let log_dir = log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "lazygrid.log");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lazygrid logging initialized");

    Ok(())
}

/// The directory where [`init`] writes log files.
pub fn log_directory() -> anyhow::Result<PathBuf> {
    let base = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("could not determine local data directory"))?;
    Ok(base.join("lazygrid").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_shape() {
        let dir = log_directory().unwrap();
        assert!(dir.ends_with("lazygrid/logs"));
    }
}
