//! Configuration loader for purgebot.
//!
//! Reads `config.toml` from the data directory (`~/.purgebot/` in production)
//! and deserializes it into [`RetentionConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed, then applies environment overrides.

use std::path::Path;

use purgebot_types::config::RetentionConfig;
use secrecy::SecretString;

/// Enables dry-run ("safe mode") when set to `true`.
pub const SAFE_MODE_ENV: &str = "PURGEBOT_SAFE_MODE";

/// Discord bot token.
pub const TOKEN_ENV: &str = "PURGEBOT_TOKEN";

/// Load configuration from `{data_dir}/config.toml` plus environment overrides.
///
/// - If the file does not exist, starts from [`RetentionConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and starts from the default.
/// - `PURGEBOT_SAFE_MODE` then overrides `dry_run` when set.
pub async fn load_config(data_dir: &Path) -> RetentionConfig {
    let mut config = load_config_file(data_dir).await;
    let safe_mode = std::env::var(SAFE_MODE_ENV).ok();
    apply_env_overrides(&mut config, safe_mode.as_deref());
    config
}

async fn load_config_file(data_dir: &Path) -> RetentionConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return RetentionConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return RetentionConfig::default();
        }
    };

    match toml::from_str::<RetentionConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            RetentionConfig::default()
        }
    }
}

/// Apply the safe-mode override. Unrecognised values are ignored with a warning.
pub fn apply_env_overrides(config: &mut RetentionConfig, safe_mode: Option<&str>) {
    let Some(raw) = safe_mode else {
        return;
    };

    match parse_flag(raw) {
        Some(enabled) => {
            config.dry_run = enabled;
            if enabled {
                tracing::info!("safe mode is on: no messages or registrations will be changed");
            }
        }
        None => {
            tracing::warn!("ignoring {SAFE_MODE_ENV}={raw:?}: expected true or false");
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Read the bot token from `PURGEBOT_TOKEN`, if set and non-empty.
pub fn bot_token_from_env() -> Option<SecretString> {
    std::env::var(TOKEN_ENV)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_file(tmp.path()).await;
        assert_eq!(config, RetentionConfig::default());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
dry_run = true
tick_interval_secs = 90
purge_reason = "channel retention"
"#,
        )
        .await
        .unwrap();

        let config = load_config_file(tmp.path()).await;
        assert!(config.dry_run);
        assert_eq!(config.tick_interval_secs, 90);
        assert_eq!(config.purge_reason, "channel retention");
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config_file(tmp.path()).await;
        assert_eq!(config, RetentionConfig::default());
    }

    #[test]
    fn safe_mode_override_enables_dry_run() {
        let mut config = RetentionConfig::default();
        apply_env_overrides(&mut config, Some("TRUE"));
        assert!(config.dry_run);
    }

    #[test]
    fn safe_mode_override_can_disable_dry_run() {
        let mut config = RetentionConfig {
            dry_run: true,
            ..RetentionConfig::default()
        };
        apply_env_overrides(&mut config, Some("false"));
        assert!(!config.dry_run);
    }

    #[test]
    fn unset_or_garbage_safe_mode_keeps_file_value() {
        let mut config = RetentionConfig {
            dry_run: true,
            ..RetentionConfig::default()
        };
        apply_env_overrides(&mut config, None);
        assert!(config.dry_run);
        apply_env_overrides(&mut config, Some("maybe"));
        assert!(config.dry_run);
    }
}
