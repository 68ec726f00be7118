//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.yaddoo/config.json`) and environment.
//! Missing file means defaults, so a fresh install talks to the local reply service.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reply service address used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

/// File name of the stored profile inside the config directory.
pub const PROFILE_FILE_NAME: &str = "profile.v1.json";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Reply service settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the profile is persisted.
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Reply service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Base URL for `/api/chat` and `/health` (default "http://localhost:3000").
    /// Overridden by YADDOO_API_BASE env.
    #[serde(default = "default_api_base")]
    pub base_url: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
        }
    }
}

/// Profile storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    /// Override the profile file. Relative paths are resolved against the config file's parent.
    /// Omit to use `profile.v1.json` next to the config file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Resolve the API base: env YADDOO_API_BASE overrides config. Trailing slashes are dropped.
pub fn resolve_api_base(config: &Config) -> String {
    std::env::var("YADDOO_API_BASE")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            let t = config.api.base_url.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(default_api_base)
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("YADDOO_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".yaddoo").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Directory holding the config file (and, by default, the profile).
pub fn config_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

/// Resolve the profile file: `config.profile.path` if set (relative paths resolved against the
/// config file's parent), otherwise `profile.v1.json` in the config directory.
pub fn resolve_profile_path(config: &Config, config_path: &Path) -> PathBuf {
    let dir = config_dir(config_path);
    match &config.profile.path {
        Some(p) if !p.as_os_str().is_empty() => {
            if p.is_absolute() {
                p.clone()
            } else {
                dir.join(p)
            }
        }
        _ => dir.join(PROFILE_FILE_NAME),
    }
}

/// Load config from the given path, or the default path (or YADDOO_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used (for resolving the profile file).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
