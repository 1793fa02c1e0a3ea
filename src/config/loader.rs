use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::types::AppConfig;

pub const CONFIG_ENV_VAR: &str = "SKILLFARM_BOARD_CONFIG";

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `$SKILLFARM_BOARD_CONFIG`
/// 3. `$XDG_CONFIG_HOME/skillfarm-board/config.toml`
/// 4. `~/.config/skillfarm-board/config.toml`
///
/// Without any file the built-in defaults apply.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(),
    };
    let Some(path) = path else {
        tracing::info!("no config file found, using defaults");
        return Ok(AppConfig::default());
    };

    let contents =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let config = parse_config(&contents)
        .with_context(|| format!("parsing TOML from {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Parse config text, rejecting values the client cannot work with.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    anyhow::ensure!(
        config.defaults.page_size > 0,
        "defaults.page_size must be at least 1"
    );
    anyhow::ensure!(
        !config.server.base_url.trim().is_empty(),
        "server.base_url must not be empty"
    );
    Ok(config)
}

fn find_config() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("skillfarm-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let p = PathBuf::from(home).join(".config/skillfarm-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}
