//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

use crate::logging::LoggingConfig;

/// Initialize tracing/logging for the process.
///
/// `RUST_LOG` wins over the configured level. Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init_with(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
