use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::autosave::DEFAULT_AUTOSAVE_DELAY;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "pinboard";

/// Shortest accepted autosave delay. Anything lower would write on nearly every frame.
const MIN_AUTOSAVE_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Where boards are stored. Defaults to `<data dir>/pinboard`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave_delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windowed: Option<bool>,

    /// Workspace (id or title) to open instead of the last one used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_workspace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `pinboard config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# Pinboard configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn defaults(&self) -> Option<&DefaultsConfig> {
        self.defaults.as_ref()
    }

    /// Configured data directory, or the platform default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = self.defaults().and_then(|d| d.data_dir.clone()) {
            return Ok(dir);
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    pub fn autosave_delay(&self) -> Duration {
        self.defaults()
            .and_then(|d| d.autosave_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_AUTOSAVE_DELAY)
    }

    pub fn windowed(&self) -> bool {
        self.defaults().and_then(|d| d.windowed).unwrap_or(true)
    }

    pub fn start_workspace(&self) -> Option<&str> {
        self.defaults().and_then(|d| d.start_workspace.as_deref())
    }

    pub fn theme(&self) -> &str {
        self.defaults()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("light")
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let defaults = self.defaults.get_or_insert_with(DefaultsConfig::default);
        match key {
            "defaults.data_dir" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Invalid data_dir: must not be empty.");
                }
                defaults.data_dir = Some(PathBuf::from(value));
            }
            "defaults.autosave_delay_ms" => {
                let ms: u64 = value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid autosave_delay_ms: {value}. Must be a number of milliseconds.")
                })?;
                if ms < MIN_AUTOSAVE_DELAY_MS {
                    anyhow::bail!(
                        "Invalid autosave_delay_ms: {value}. Must be at least {MIN_AUTOSAVE_DELAY_MS}."
                    );
                }
                defaults.autosave_delay_ms = Some(ms);
            }
            "defaults.windowed" => {
                let windowed = match value {
                    "true" | "yes" | "on" => true,
                    "false" | "no" | "off" => false,
                    _ => anyhow::bail!("Invalid windowed: {value}. Must be 'true' or 'false'."),
                };
                defaults.windowed = Some(windowed);
            }
            "defaults.start_workspace" => {
                defaults.start_workspace = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.trim().to_string())
                };
            }
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                defaults.theme = Some(value.to_string());
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.data_dir, defaults.autosave_delay_ms, defaults.windowed, defaults.start_workspace, defaults.theme"
            ),
        }
        Ok(())
    }
}
