//! Config loader — reads `~/.quillpad/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.quillpad/config.json`
//! 3. Environment variables `QUILLPAD_<FIELD>` (override JSON)

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::schema::Config;
use crate::types::Provider;

/// Quillpad data directory (e.g. `~/.quillpad/`).
fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".quillpad")
}

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be
/// parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply `QUILLPAD_*` environment overrides on top of a loaded config.
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(value) = std::env::var("QUILLPAD_PROVIDER") {
        match value.parse::<Provider>() {
            Ok(provider) => config.connection.provider = provider,
            Err(e) => warn!("Ignoring QUILLPAD_PROVIDER: {}", e),
        }
    }
    if let Ok(value) = std::env::var("QUILLPAD_ENDPOINT") {
        config.connection.endpoint = value;
    }
    if let Ok(value) = std::env::var("QUILLPAD_API_KEY") {
        config.connection.api_key = value;
    }
    if let Ok(value) = std::env::var("QUILLPAD_MODEL") {
        config.connection.model = value;
    }
    if let Ok(value) = std::env::var("QUILLPAD_PROXY_ENDPOINT") {
        config.connection.proxy_endpoint = value;
    }
    config
}

/// Helper to get home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
