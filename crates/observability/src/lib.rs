//! Tracing and logging setup shared by processes embedding the ledger.

/// Initialize process-wide tracing from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init_with(&logging::LoggingConfig::from_env());
}

/// Tracing subscriber installation.
pub mod tracing;

/// Logging configuration.
pub mod logging;

pub use logging::LoggingConfig;
