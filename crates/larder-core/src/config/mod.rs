//! User configuration
//!
//! A small TOML file holds the kitchen defaults and the database location.
//! A missing file means defaults; nothing is written to disk until the user
//! changes something.

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::scaling::UnitSystem;

/// Larder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub kitchen: KitchenConfig,
    pub database: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenConfig {
    /// Unit system new cooking instances default to ("us" or "metric")
    pub default_unit_system: String,
    /// Scale factor new cooking instances default to
    pub default_scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the platform-default database location when set
    pub path: Option<PathBuf>,
    /// Maximum connections in the pool
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kitchen: KitchenConfig {
                default_unit_system: "us".to_string(),
                default_scale: 1.0,
            },
            database: StorageConfig {
                path: None,
                max_connections: 5,
            },
        }
    }
}

impl Config {
    /// Dotted keys `get`/`set`/`list` understand.
    const KEYS: [&'static str; 4] = [
        "kitchen.default_unit_system",
        "kitchen.default_scale",
        "database.path",
        "database.max_connections",
    ];

    /// Directory the config file lives in. `LARDER_CONFIG_DIR` wins over
    /// the platform default.
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        if let Ok(custom) = env::var("LARDER_CONFIG_DIR") {
            return Ok(PathBuf::from(custom));
        }
        let base = dirs::config_dir().ok_or_else(|| anyhow!("No platform config directory"))?;
        Ok(base.join("larder"))
    }

    /// Full path of config.toml.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Read the config file, falling back to defaults when it does not
    /// exist yet.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("Malformed config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and write the config file, creating its directory on the
    /// first save.
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let rendered = toml::to_string_pretty(self).context("Failed to render config as TOML")?;
        let path = Self::config_path()?;
        fs::write(&path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Reject values the rest of the system cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if UnitSystem::from_str(&self.kitchen.default_unit_system).is_none() {
            return Err(anyhow!(
                "Invalid default_unit_system: {}. Valid options: us, metric",
                self.kitchen.default_unit_system
            ));
        }
        if !self.kitchen.default_scale.is_finite() || self.kitchen.default_scale <= 0.0 {
            return Err(anyhow!(
                "default_scale must be a positive number, got {}",
                self.kitchen.default_scale
            ));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow!("database.max_connections must be at least 1"));
        }
        Ok(())
    }

    /// The unit system new instances default to
    pub fn default_unit_system(&self) -> UnitSystem {
        UnitSystem::from_str(&self.kitchen.default_unit_system).unwrap_or(UnitSystem::Us)
    }

    /// Value at a dotted key, rendered for display.
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "kitchen.default_unit_system" => Ok(self.kitchen.default_unit_system.clone()),
            "kitchen.default_scale" => Ok(self.kitchen.default_scale.to_string()),
            "database.path" => Ok(match &self.database.path {
                Some(path) => path.display().to_string(),
                None => "(platform default)".to_string(),
            }),
            "database.max_connections" => Ok(self.database.max_connections.to_string()),
            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `larder config list` to see available keys.",
                key
            )),
        }
    }

    /// Parse and store a value at a dotted key.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "kitchen.default_unit_system" => {
                if UnitSystem::from_str(value).is_none() {
                    return Err(anyhow!(
                        "Invalid unit system: {}. Valid options: us, metric",
                        value
                    ));
                }
                self.kitchen.default_unit_system = value.to_lowercase();
            }
            "kitchen.default_scale" => {
                let scale: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid default_scale value: {}", value))?;
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(anyhow!("default_scale must be a positive number"));
                }
                self.kitchen.default_scale = scale;
            }
            "database.path" => {
                // An empty value falls back to the platform default
                self.database.path = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "database.max_connections" => {
                let max: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_connections value: {}", value))?;
                if max == 0 {
                    return Err(anyhow!("max_connections must be at least 1"));
                }
                self.database.max_connections = max;
            }
            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `larder config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// Every known key with its current display value.
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        Self::KEYS
            .iter()
            .map(|&key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Delete the config file so the next load sees defaults.
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
        }
        Ok(())
    }
}
