//! `wabot config`: print the effective configuration.

use std::path::{Path, PathBuf};

use wabot_infra::config::{default_config_path, load_bot_config};
use wabot_types::config::BotConfig;

/// The config file to use: the explicit path, else the platform default,
/// else `config.toml` in the working directory.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(default_config_path)
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Load and print the config, with defaults filled in.
pub async fn show_config(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_bot_config(config_path).await;
    let rendered = render_config(&config, json)?;

    if json {
        println!("{rendered}");
    } else {
        let exists = tokio::fs::try_exists(config_path).await.unwrap_or(false);
        let note = if exists { "" } else { " (not found, showing defaults)" };
        println!(
            "{}",
            console::style(format!("# {}{note}", config_path.display())).dim()
        );
        println!();
        print!("{rendered}");
    }
    Ok(())
}

fn render_config(config: &BotConfig, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(config)?)
    } else {
        Ok(toml::to_string_pretty(config)?)
    }
}
