//! File-based logging setup.
//!
//! The terminal belongs to the TUI, so log lines go to a daily-rotating
//! file under the config root. The returned guard must be held for the
//! duration of the program to keep the non-blocking writer flushing.

use std::fs;
use std::path::Path;

use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::Result;

/// Setup logging with a daily-rotating file appender.
///
/// The filter follows `DISTUI_LOG` when set (env-filter syntax), with
/// `debug_mode` choosing the default level otherwise.
pub fn setup_logging(
    log_dir: &Path,
    debug_mode: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    let file_appender = rolling::daily(log_dir, "distui.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if debug_mode { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_env("DISTUI_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false) // No ANSI codes in log files
                .with_target(true),
        )
        .init();

    tracing::info!(dir = %log_dir.display(), debug = debug_mode, "logging initialized");

    Ok(guard)
}
