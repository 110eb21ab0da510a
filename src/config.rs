//! Configuration system for vitrine
//!
//! Loads configuration from TOML file at `~/.config/vitrine/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `hotkey.<letter>` = shell command run on super+letter
    pub hotkey: BTreeMap<String, String>,
    pub compositor: CompositorConfig,
    pub launch: LaunchConfig,
    /// The file as parsed, for key-path lookups
    #[serde(skip)]
    raw: toml::Table,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Self::with_defaults();
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config = Self::parse(&content).context("Failed to parse config file")?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parse a configuration document
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.raw = toml::from_str(content)?;

        Ok(config)
    }

    fn with_defaults() -> Result<Self> {
        let mut config = Self::default();
        config.raw = toml::from_str(&toml::to_string(&config)?)?;

        Ok(config)
    }

    /// Look up a string value by dotted key path, e.g. `hotkey.t`
    pub fn lookup(&self, path: &str) -> Option<&str> {
        let mut keys = path.split('.');
        let mut value = self.raw.get(keys.next()?)?;
        for key in keys {
            value = value.as_table()?.get(key)?;
        }

        value.as_str()
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("vitrine");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string).context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Compositor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Clip repaints to the damaged area instead of redrawing whole screens.
    /// Known to misdraw screens that are not at the desktop origin.
    pub partial_damage_clip: bool,
}

/// Hotkey process launching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Environment variable carrying the active screen index to children
    pub screen_env: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            screen_env: "VITRINE_SCREEN".to_string(),
        }
    }
}
