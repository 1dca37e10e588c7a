use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const STORAGE_FILE: &str = "focus-app-storage.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    /// YouTube Data API v3 key. Without it the player column shows a
    /// blocking configuration error and playback features stay off.
    pub youtube_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("focus-dj"),
            youtube_api_key: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("focus-dj")
            .join("config.json");

        let mut config: Self = if config_path.exists() {
            let config_str = std::fs::read_to_string(config_path)?;
            serde_json::from_str(&config_str)?
        } else {
            Self::default()
        };

        // The environment wins over the config file.
        if let Ok(key) = std::env::var("FOCUSDJ_YOUTUBE_API_KEY") {
            let key = key.trim().to_string();
            if !key.is_empty() {
                config.youtube_api_key = Some(key);
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("focus-dj");

        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.json");
        let config_str = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, config_str)?;

        Ok(())
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }
}
