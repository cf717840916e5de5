//! Configuration management for the garage manager
//!
//! Config stored at: ~/.config/garage/config.json

use std::path::{Path, PathBuf};

use garage_infra::DEFAULT_QUOTA_BYTES;
use garage_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the stored API key
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory override (holds the garage blob)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Total bytes the garage blob may use
    #[serde(default = "default_quota")]
    pub storage_quota_bytes: usize,

    /// OpenWeatherMap API key
    #[serde(default)]
    pub openweather_api_key: Option<String>,

    /// Language for forecast descriptions (e.g., pt_br, en)
    #[serde(default = "default_forecast_lang")]
    pub forecast_lang: String,

    /// Days shown by `forecast` when --days is not given; 0 means all
    #[serde(default = "default_forecast_days")]
    pub default_forecast_days: i64,

    /// Vehicle details file override
    #[serde(default)]
    pub details_file: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
}

fn default_quota() -> usize {
    DEFAULT_QUOTA_BYTES
}

fn default_forecast_lang() -> String {
    "pt_br".to_string()
}

fn default_forecast_days() -> i64 {
    5
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_quota_bytes: default_quota(),
            openweather_api_key: None,
            forecast_lang: default_forecast_lang(),
            default_forecast_days: default_forecast_days(),
            details_file: None,
            output_format: default_output_format(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("garage");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("garage");
        Ok(data_dir)
    }

    /// Get the vehicle details file path
    pub fn details_path(&self) -> Result<PathBuf> {
        match self.details_file {
            Some(ref path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join("vehicle_details.json")),
        }
    }

    /// API key from the environment, else from the config file
    pub fn api_key(&self) -> Option<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        Self::pick_api_key(from_env, self.openweather_api_key.clone())
    }

    fn pick_api_key(from_env: Option<String>, stored: Option<String>) -> Option<String> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or(stored.filter(|k| !k.trim().is_empty()))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from a specific file, or default if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveError(format!("{}: {}", parent.display(), e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Garage Configuration")?;
        writeln!(f, "====================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Data dir:       {}",
            self.data_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Storage quota:  {} bytes", self.storage_quota_bytes)?;
        writeln!(
            f,
            "Details file:   {}",
            self.details_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        let key_status = if std::env::var(API_KEY_ENV).map(|k| !k.trim().is_empty()).unwrap_or(false) {
            format!("(from {})", API_KEY_ENV)
        } else if self.openweather_api_key.is_some() {
            "(set)".to_string()
        } else {
            "(not set)".to_string()
        };
        writeln!(f, "API key:        {}", key_status)?;
        writeln!(f, "Forecast lang:  {}", self.forecast_lang)?;
        writeln!(f, "Forecast days:  {}", self.default_forecast_days)?;
        writeln!(f, "Output format:  {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:    {}", path.display())?;
        }

        Ok(())
    }
}
