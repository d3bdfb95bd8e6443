//! Configuration management for Tally
//!
//! This crate handles loading and validating `.tally/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_common::{Result, TallyError};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Session root path (set programmatically, not in TOML)
    #[serde(skip)]
    pub root: PathBuf,

    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Telemetry settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Session configuration ([session])
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Id of the signed-in user. Empty until `tally init` runs.
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub display_name: String,
}

/// Store configuration ([store])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file path, relative to the session root
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

fn default_data_file() -> String {
    ".tally/store.json".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

/// Telemetry configuration ([telemetry])
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from a session root
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(".tally/config.toml");

        if !config_path.exists() {
            return Ok(Self {
                root: root.to_path_buf(),
                session: SessionConfig::default(),
                store: StoreConfig::default(),
                telemetry: TelemetryConfig::default(),
            });
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| TallyError::ConfigError(format!("Failed to read config: {}", e)))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| TallyError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Write the configuration back to `.tally/config.toml`
    pub fn save(&self) -> Result<()> {
        let dir = self.root.join(".tally");
        std::fs::create_dir_all(&dir)?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| TallyError::ConfigError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(dir.join("config.toml"), content)?;
        Ok(())
    }

    /// Initialize a session root with a fresh user id, keeping an existing
    /// user id if one is already configured
    pub fn init(root: &Path, display_name: &str) -> Result<Self> {
        let mut config = Self::load(root)?;
        if config.session.user_id.is_empty() {
            config.session.user_id = uuid::Uuid::new_v4().to_string();
        }
        config.session.display_name = display_name.to_string();
        config.save()?;
        Ok(config)
    }

    /// Absolute path of the store file
    pub fn store_path(&self) -> PathBuf {
        self.root.join(&self.store.data_file)
    }

    /// Fail when the session has not been initialized yet
    pub fn require_user(&self) -> Result<&str> {
        if self.session.user_id.is_empty() {
            return Err(TallyError::ConfigError(
                "no user configured, run 'tally init' first".to_string(),
            ));
        }
        Ok(&self.session.user_id)
    }
}
