//! Configuration types for purgebot.
//!
//! `RetentionConfig` represents the top-level `config.toml` that controls
//! dry-run mode, the scheduler tick interval, and platform connection
//! settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::platform::DEFAULT_PURGE_REASON;

/// Top-level configuration.
///
/// Loaded from `~/.purgebot/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Log what would happen without touching the registry or any messages.
    #[serde(default)]
    pub dry_run: bool,

    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// How many channels are purged at once within a tick (1 = sequential).
    #[serde(default = "default_purge_concurrency")]
    pub purge_concurrency: usize,

    /// Audit-log reason attached to every purge.
    #[serde(default = "default_purge_reason")]
    pub purge_reason: String,

    #[serde(default)]
    pub discord: DiscordConfig,
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_purge_concurrency() -> usize {
    1
}

fn default_purge_reason() -> String {
    DEFAULT_PURGE_REASON.to_string()
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            tick_interval_secs: default_tick_interval_secs(),
            purge_concurrency: default_purge_concurrency(),
            purge_reason: default_purge_reason(),
            discord: DiscordConfig::default(),
        }
    }
}

impl RetentionConfig {
    /// Tick period, never shorter than one second.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }

    /// Purge fan-out width, never below one.
    pub fn purge_concurrency(&self) -> usize {
        self.purge_concurrency.max(1)
    }
}

/// Discord REST connection settings. The bot token is not part of the file;
/// it comes from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = RetentionConfig::default();
        assert!(!config.dry_run);
        assert_eq!(config.tick_interval(), Duration::from_secs(60));
        assert_eq!(config.purge_concurrency(), 1);
        assert_eq!(config.purge_reason, DEFAULT_PURGE_REASON);
        assert_eq!(config.discord.api_base_url, "https://discord.com/api/v10");
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: RetentionConfig = toml::from_str("").unwrap();
        assert_eq!(config, RetentionConfig::default());
    }

    #[test]
    fn test_deserialize_with_values() {
        let toml_str = r#"
dry_run = true
tick_interval_secs = 300
purge_concurrency = 4

[discord]
api_base_url = "http://localhost:8080/api"
"#;
        let config: RetentionConfig = toml::from_str(toml_str).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.tick_interval(), Duration::from_secs(300));
        assert_eq!(config.purge_concurrency(), 4);
        assert_eq!(config.discord.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.discord.request_timeout_secs, 30);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let config = RetentionConfig {
            tick_interval_secs: 0,
            purge_concurrency: 0,
            ..RetentionConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.purge_concurrency(), 1);
    }
}
