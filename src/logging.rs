//! Diagnostic logging to a file.
//!
//! stdout is the display and stderr carries fatal messages, so logs only
//! ever go to the file named by `HACKERTYPER_LOG`. Unset means no
//! subscriber at all.

use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable naming the log file.
pub const LOG_FILE_ENV: &str = "HACKERTYPER_LOG";

/// Log file requested through the environment, if any.
pub fn log_file_from_env() -> Option<PathBuf> {
    env::var_os(LOG_FILE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Install the global subscriber when a log file is configured.
///
/// Logging is best effort: an unwritable path leaves the program silent
/// rather than failing it.
pub fn init() {
    let Some(path) = log_file_from_env() else {
        return;
    };
    let Ok(file) = File::create(&path) else {
        return;
    };
    if build_subscriber(file).try_init().is_ok() {
        tracing::info!(path = %path.display(), "logging enabled");
    }
}

/// File writer without ANSI colors, filtered by `RUST_LOG` (default `info`).
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
