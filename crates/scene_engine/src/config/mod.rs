//! Configuration system
//!
//! Engine settings load from TOML or RON files, picked by extension.
//! Missing files are not an error at the call sites that want defaults;
//! those call [`Config::load_or_default`].

pub use serde::{Deserialize, Serialize};

use crate::animation::DEFAULT_TICKS_PER_SECOND;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Load configuration, falling back to defaults if the file is absent
    fn load_or_default(path: &str) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at '{path}', using defaults");
                Self::default()
            }
            Err(e) => {
                log::warn!("failed to load config '{path}': {e}, using defaults");
                Self::default()
            }
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Animation playback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSettings {
    /// Tick rate assumed for clips that do not declare one
    pub default_ticks_per_second: f32,
    /// Initial playback speed multiplier for new animators
    pub playback_speed: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            playback_speed: 1.0,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Application name, used for logging
    pub app_name: String,
    /// Animation playback settings
    pub animation: AnimationSettings,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Check settings for values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation.default_ticks_per_second <= 0.0 {
            return Err(ConfigError::Parse(
                "animation.default_ticks_per_second must be positive".to_string(),
            ));
        }
        if self.animation.playback_speed < 0.0 {
            return Err(ConfigError::Parse(
                "animation.playback_speed must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
