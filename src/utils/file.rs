use std::{env, fs, path::{Path, PathBuf}};

use anyhow::{bail, Context as _, Result};

use crate::models::BotConfig;

pub const DEFAULT_CONFIG_PATH: &str = "token.json";

/// `GRIND_CONFIG` if set, `token.json` in the working directory otherwise.
pub fn config_path() -> PathBuf {
    env::var_os("GRIND_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn load_config(path: &Path) -> Result<BotConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    parse_config(&raw, env::var("DISCORD_TOKEN").ok())
        .with_context(|| format!("invalid config in {}", path.display()))
}

/// Parses a JSON config. A non-empty `token_override` replaces the file's token.
pub fn parse_config(raw: &str, token_override: Option<String>) -> Result<BotConfig> {
    let mut config: BotConfig = serde_json::from_str(raw)?;

    if let Some(token) = token_override.filter(|t| !t.trim().is_empty()) {
        config.token = token;
    }
    if config.token.trim().is_empty() {
        bail!("token is empty");
    }
    if config.channel.is_empty() {
        bail!("channel pattern is empty, it would match every channel");
    }

    Ok(config)
}
