//! Bot configuration loader.
//!
//! Reads `config.toml` (by default from `<config_dir>/wabot/`) and
//! deserializes it into [`BotConfig`]. Falls back to defaults when the file is
//! missing or malformed, so the bot always starts.

use std::path::{Path, PathBuf};

use wabot_types::config::BotConfig;

/// Default location of the config file: `<config_dir>/wabot/config.toml`.
///
/// Returns `None` on platforms without a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wabot").join("config.toml"))
}

/// Load bot configuration from `config_path`.
///
/// - If the file does not exist, returns [`BotConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
/// - Otherwise returns the parsed config; omitted fields keep their defaults.
pub async fn load_bot_config(config_path: &Path) -> BotConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return BotConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return BotConfig::default();
        }
    };

    match toml::from_str::<BotConfig>(&content) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", config_path.display());
            config
        }
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            BotConfig::default()
        }
    }
}
