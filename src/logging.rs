use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "FLUX_FACTORY_LOG";

/// Initialize tracing with optional file output.
///
/// Logging is disabled by default.
/// Set `FLUX_FACTORY_LOG` env var to a file path to enable logging;
/// `RUST_LOG` controls the filter (default `info`).
///
/// Returns whether a subscriber was installed. Calling this again, or after
/// another global subscriber was set, returns `false`.
pub fn init_tracing() -> bool {
    let Some(log_path) = std::env::var(LOG_ENV).ok() else {
        return false;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let Ok(file) = std::fs::File::create(&log_path) else {
        eprintln!("Warning: Failed to create log file: {}", log_path);
        return false;
    };

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_ok()
}
