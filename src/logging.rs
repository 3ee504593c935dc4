//! File-based tracing setup.
//!
//! The TUI owns the terminal, so logs go to a file (`nashra.log` by
//! default, overridable with `NASHRA_LOG_FILE`).  `NASHRA_LOG` carries the
//! usual env-filter directives; the default level is `info`.

use std::fs::OpenOptions;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

// Keeps the non-blocking writer alive for the process lifetime.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn init() {
    let filter = EnvFilter::try_from_env("NASHRA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let path = std::env::var("NASHRA_LOG_FILE").unwrap_or_else(|_| "nashra.log".to_string());

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %path, "logging initialized");
        }
        Err(_) => {
            // Unwritable log path: fall back to stderr.  Only the one-shot
            // CLI modes keep stderr readable, but losing logs beats not
            // starting.
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
        }
    }
}
