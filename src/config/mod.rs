// Configuration management for TuneDeck
// Handles loading/saving settings, with sensible defaults when config is missing

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::history::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub music_directory: PathBuf,
    pub playlists_file: PathBuf,
    pub extension: String,
    pub history_capacity: usize,
    pub log_directory: PathBuf,
    pub ui: UiConfig,
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
    pub queue_preview: usize, // upcoming playlist songs shown on the main screen
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // relative to where the player is launched, like the music folder next to it
            music_directory: PathBuf::from("music"),
            playlists_file: PathBuf::from("playlists.txt"),
            extension: "ogg".to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            log_directory: Self::app_dir().join("logs"),
            ui: UiConfig::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            queue_preview: 5,
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self { volume: 0.7 }
    }
}

impl Config {
    /// Load from the user config dir, writing defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)
            .with_context(|| format!("writing {}", config_path.display()))?;

        Ok(())
    }

    /// Command-line values win over the file.
    pub fn with_overrides(mut self, music_dir: Option<PathBuf>, playlists: Option<PathBuf>) -> Self {
        if let Some(dir) = music_dir {
            self.music_directory = dir;
        }
        if let Some(file) = playlists {
            self.playlists_file = file;
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("tunedeck");

        Ok(dir.join("config.toml"))
    }

    fn app_dir() -> PathBuf {
        config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tunedeck")
    }
}
