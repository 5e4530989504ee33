//! Persistent settings storage.
//!
//! Settings live in a JSON document keyed like the device storage
//! (`stretch`, `rest`, `reps`, `audio`, `haptics`, `promptVolume`).
//! A missing file means defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::TimerConfig;

/// Directory under the user config directory.
const APP_DIR: &str = "stretch-release";

/// Settings file name.
const SETTINGS_FILE: &str = "settings.json";

/// Reads and writes [`TimerConfig`] as JSON.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(Self::new(dir.join(APP_DIR).join(SETTINGS_FILE)))
    }

    /// Path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored settings, or defaults when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds out-of-range values.
    pub fn load(&self) -> Result<TimerConfig> {
        if !self.path.exists() {
            tracing::debug!("No settings at {:?}, using defaults", self.path);
            return Ok(TimerConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings: {:?}", self.path))?;
        let config: TimerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {:?}", self.path))?;
        config
            .validate()
            .with_context(|| format!("Invalid settings in {:?}", self.path))?;

        Ok(config)
    }

    /// Writes the settings, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, config: &TimerConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory: {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(config).context("Failed to serialize settings")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write settings: {:?}", self.path))?;

        tracing::debug!("Saved settings to {:?}", self.path);
        Ok(())
    }
}
