//! Configuration loading and representation.

use serde::Deserialize;

pub const MAX_BATCH_SIZE_VAR: &str = "TXLEDGER_MAX_BATCH_SIZE";
pub const OPTIMISTIC_CONCURRENCY_VAR: &str = "TXLEDGER_OPTIMISTIC_CONCURRENCY";

/// Repository behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    /// Largest number of candidates accepted by one `save` call.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Append reversals with an exact store version so concurrent amendments of
    /// the same transaction cannot both succeed.
    #[serde(default = "default_optimistic_concurrency")]
    pub optimistic_concurrency: bool,
}

fn default_max_batch_size() -> usize {
    1000
}

fn default_optimistic_concurrency() -> bool {
    true
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            optimistic_concurrency: default_optimistic_concurrency(),
        }
    }
}

impl LedgerConfig {
    /// Load from `TXLEDGER_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup. Unparseable values are logged and
    /// replaced by their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_BATCH_SIZE_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.max_batch_size = size,
                _ => tracing::warn!(
                    value = %raw,
                    "{MAX_BATCH_SIZE_VAR} must be a positive integer; using default"
                ),
            }
        }

        if let Some(raw) = lookup(OPTIMISTIC_CONCURRENCY_VAR) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.optimistic_concurrency = true,
                "0" | "false" | "no" | "off" => config.optimistic_concurrency = false,
                _ => tracing::warn!(
                    value = %raw,
                    "{OPTIMISTIC_CONCURRENCY_VAR} must be a boolean; using default"
                ),
            }
        }

        config
    }
}
