use crate::error::{HeadcountError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "HEADCOUNT_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Model answering single-image scans
    pub headcount_model: String,
    /// Model answering live camera frames
    pub head_detection_model: String,
    pub display_width: u32,
    pub display_height: u32,
    pub frame_interval_ms: u64,
    pub camera_index: u32,
    pub result_file: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://serverless.roboflow.com".into(),
            api_key: None,
            headcount_model: "crowd-counting-dataset-w3o7w/2".into(),
            head_detection_model: "head-detection/2".into(),
            display_width: 780,
            display_height: 500,
            frame_interval_ms: 30,  // ~30 fps ceiling
            camera_index: 0,
            result_file: PathBuf::from("inference_result.json"),
            log_level: "info".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| HeadcountError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("headcount").join("config.json"))
    }

    /// The environment variable wins over the config file.
    pub fn get_api_key(&self) -> Result<String> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn display_bound(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn result_file_name(&self) -> String {
        self.result_file.display().to_string()
    }
}

fn resolve_api_key(from_env: Option<String>, from_file: Option<&str>) -> Result<String> {
    from_env
        .filter(|key| !key.trim().is_empty())
        .or_else(|| from_file.filter(|key| !key.trim().is_empty()).map(str::to_owned))
        .ok_or(HeadcountError::MissingApiKey)
}
