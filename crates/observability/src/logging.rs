use serde::Deserialize;

pub const LOG_LEVEL_VAR: &str = "TXLEDGER_LOG_LEVEL";
pub const LOG_JSON_VAR: &str = "TXLEDGER_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default = "default_json")]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: default_json(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unrecognised boolean values keep the default; a logger is not running
    /// yet, so nothing is reported.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(LOG_LEVEL_VAR).filter(|l| !l.trim().is_empty()) {
            config.level = level.trim().to_string();
        }
        if let Some(raw) = lookup(LOG_JSON_VAR) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.json = true,
                "0" | "false" | "no" | "off" => config.json = false,
                _ => {}
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_json_at_info() {
        let config = LoggingConfig::from_lookup(|_| None);
        assert_eq!(config.level, "info");
        assert!(config.json);
    }

    #[test]
    fn reads_overrides() {
        let config = LoggingConfig::from_lookup(|key| match key {
            LOG_LEVEL_VAR => Some("txledger_infra=debug".to_string()),
            LOG_JSON_VAR => Some("false".to_string()),
            _ => None,
        });
        assert_eq!(config.level, "txledger_infra=debug");
        assert!(!config.json);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: LoggingConfig = serde_json::from_str(r#"{"json": false}"#).unwrap();
        assert_eq!(config.level, "info");
        assert!(!config.json);
    }
}
