//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the club roster, the weekly session day, the currency label and where the
//! record tables live.
//!
//! Configuration is stored at `~/.config/rollcall/config.json`. The data
//! directory can be overridden with the `ROLLCALL_DATA_DIR` environment
//! variable (a `.env` file works too).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/data directory paths
const APP_NAME: &str = "rollcall";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "ROLLCALL_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub club_name: String,
    /// Names offered on the registration form. Empty accepts any name.
    pub roster: Vec<String>,
    /// Day of the weekly session, e.g. "Tue"
    pub session_weekday: String,
    pub currency: String,
    /// How many past sessions the form offers for late registration
    pub past_sessions: usize,
    pub future_sessions: usize,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            club_name: "Volleyball".to_string(),
            roster: Vec::new(),
            session_weekday: "Tue".to_string(),
            currency: "Ft".to_string(),
            past_sessions: 8,
            future_sessions: 2,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_json(&contents)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse config file")
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Write the default config unless a file already exists.
    /// Returns the path and whether it was written.
    pub fn init_default() -> Result<(PathBuf, bool)> {
        let path = Self::config_path()?;
        if path.exists() {
            return Ok((path, false));
        }
        Self::default().save_to(&path)?;
        Ok((path, true))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Environment override, then the config file, then the platform data dir.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Parsed session weekday; an unrecognised value falls back to Tuesday.
    pub fn weekday(&self) -> Weekday {
        match self.session_weekday.parse::<Weekday>() {
            Ok(day) => day,
            Err(_) => {
                warn!(value = %self.session_weekday, "Unknown session weekday, using Tuesday");
                Weekday::Tue
            }
        }
    }
}
