//! Logging configuration for hashbank
//!
//! Provides dual-output logging:
//! - Console: respects RUST_LOG env var
//! - File: writes to ~/.local/state/hashbank/logs/
//!
//! Log files are rotated daily. Library code logs through the `log`
//! macros; the subscriber picks those up via the tracing-log bridge.

use crate::constants::{APP_NAME, LOG_DIR_NAME};
use std::fs;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    Layer,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Returns the log directory path: $XDG_STATE_HOME/hashbank/logs/
/// Falls back to ~/.local/state/hashbank/logs/
pub fn get_log_dir() -> PathBuf {
    let state_home = std::env::var("XDG_STATE_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            format!("{}/.local/state", home)
        });

    PathBuf::from(state_home).join(APP_NAME).join(LOG_DIR_NAME)
}

/// Initialize logging with dual output:
/// - Console (stderr): INFO by default, DEBUG with the CLI debug flag,
///   both overridable through RUST_LOG
/// - File: DEBUG level, rotates daily
///
/// Returns a guard that must be kept alive for the file appender to work.
/// When the guard is dropped, pending logs are flushed.
pub fn init_logging(debug: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = if debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let log_dir = get_log_dir();
    if fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "hashbank.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer.with_filter(EnvFilter::new("debug")))
            .init();

        Some(guard)
    } else {
        // Console-only fallback when the log dir cannot be created
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}

/// Log a store-integrity event (record replacements, colliding digests).
#[macro_export]
macro_rules! integrity_event {
    ($($arg:tt)*) => {
        tracing::warn!(target: "integrity", $($arg)*)
    };
}
