//! Tracing setup
//!
//! Diagnostics go to stderr so stdout stays clean for command output.
//! With debug logging enabled, a second layer appends everything to
//! `ridenote.log` in the data directory.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. Call once, before any command runs.
pub fn init(debug_log: bool, data_dir: &Path) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let file_layer = if debug_log {
        match open_log_file(data_dir) {
            Ok(file) => Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false),
            ),
            Err(e) => {
                eprintln!("Could not open debug log: {}", e);
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

fn open_log_file(data_dir: &Path) -> std::io::Result<std::fs::File> {
    std::fs::create_dir_all(data_dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("ridenote.log"))
}
