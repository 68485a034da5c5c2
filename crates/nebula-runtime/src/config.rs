use nebula_core::HISTORY_CAP;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Session configuration. Every field has a default, so an empty or partial
/// YAML file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Save file location.
    pub save_path: PathBuf,
    /// RNG seed; entropy when absent.
    pub seed: Option<u64>,
    /// Planets kept in history.
    pub history_cap: usize,
    /// Auto-roll period in milliseconds.
    pub auto_roll_interval_ms: u64,
    /// Rolls required before auto-roll can be switched on.
    pub auto_roll_min_rolls: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(persistence::default_save_path()),
            seed: None,
            history_cap: HISTORY_CAP,
            auto_roll_interval_ms: 3_000,
            auto_roll_min_rolls: 100,
        }
    }
}

impl GameConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = if text.trim().is_empty() {
            GameConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a YAML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_cap == 0 {
            return Err(ConfigError::Invalid("history_cap must be > 0".into()));
        }
        if self.auto_roll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "auto_roll_interval_ms must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn auto_roll_interval(&self) -> Duration {
        Duration::from_millis(self.auto_roll_interval_ms)
    }
}
