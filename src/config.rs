//! Configuration for the signal playground.

use crate::core::WindowSize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port the HTTP server binds to on localhost
    pub port: u16,

    /// Slider value new window sessions start with
    pub default_window_size: WindowSize,

    /// Seed for dataset noise; `None` draws fresh noise on every start
    #[serde(default)]
    pub seed: Option<u64>,

    /// Path for storing activity logs
    pub data_path: PathBuf,

    /// Directory of `<name>.json` series to serve instead of generated ones
    #[serde(default)]
    pub dataset_dir: Option<PathBuf>,

    /// Most window sessions the server keeps at once
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Seconds without a request after which a session may be evicted
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_max_sessions() -> usize {
    1024
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("signal-playground");

        Self {
            port: 8000,
            default_window_size: WindowSize::default(),
            seed: None,
            data_path: data_dir,
            dataset_dir: None,
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("signal-playground")
            .join("config.json")
    }

    /// Path of the persisted activity log.
    pub fn activity_path(&self) -> PathBuf {
        self.data_path.join("activity.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Replace the default window size with a validated slider value.
    pub fn set_default_window_size(&mut self, value: f64) -> Result<(), ConfigError> {
        self.default_window_size =
            WindowSize::new(value).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::InvalidValue(e) => write!(f, "Invalid value: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
