//! Tracing setup for the two run modes.
//!
//! CLI commands log to stderr. The dashboard owns the terminal (raw mode,
//! alternate screen), so it logs to a daily-rolling file instead.

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "corpus-admin.log";

/// `RUST_LOG` wins over the mode's default directive
fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Directory for dashboard log files: `<data dir>/corpus-admin/logs`
pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("corpus-admin").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize logging for one-shot CLI commands (stderr)
pub fn init_cli(verbose: bool) {
    let default_filter = if verbose { "corpus_admin=debug" } else { "corpus_admin=warn" };

    let _ = tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Initialize file logging for the interactive dashboard.
///
/// The returned guard flushes buffered lines on drop and must outlive the
/// dashboard.
pub fn init_tui(verbose: bool) -> Option<WorkerGuard> {
    let dir = log_dir();
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("Failed to create log directory {}: {}", dir.display(), e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = if verbose { "corpus_admin=debug" } else { "corpus_admin=info" };
    let initialized = tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .try_init();

    if initialized.is_err() {
        return None;
    }

    tracing::info!("Dashboard logging to {}", dir.join(LOG_FILE_PREFIX).display());
    Some(guard)
}
