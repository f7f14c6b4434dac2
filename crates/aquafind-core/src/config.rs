//! Application configuration management.
//!
//! Configuration covers the Overpass endpoint, the User-Agent sent with
//! queries, the default search radius, and an optional cache directory.
//! It is stored at `~/.config/aquafind/config.json`; any field may be
//! overridden from the environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{DEFAULT_OVERPASS_URL, DEFAULT_RADIUS_METERS};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "aquafind";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_OVERPASS_URL: &str = "AQUAFIND_OVERPASS_URL";
pub const ENV_CACHE_DIR: &str = "AQUAFIND_CACHE_DIR";
pub const ENV_RADIUS: &str = "AQUAFIND_RADIUS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub overpass_url: String,
    pub user_agent: String,
    pub default_radius_meters: f64,
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            user_agent: concat!("aquafind/", env!("CARGO_PKG_VERSION")).to_string(),
            default_radius_meters: DEFAULT_RADIUS_METERS,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load from the config file (defaults if missing), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from a key lookup (the environment in practice).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_OVERPASS_URL).filter(|s| !s.is_empty()) {
            self.overpass_url = url;
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|s| !s.is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(radius) = lookup(ENV_RADIUS) {
            match radius.parse::<f64>() {
                Ok(r) if r > 0.0 => self.default_radius_meters = r,
                _ => warn!(value = %radius, "Ignoring invalid {}", ENV_RADIUS),
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
