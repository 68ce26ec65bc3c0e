//! Simulation configuration
//!
//! Supports loading configs in RON (Rusty Object Notation) or JSON format;
//! defaults reproduce the stock ecosystem tuning.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Tunable world parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Viewport width in world units; the tile grid is centered inside it
    pub width: u32,
    /// Viewport height in world units
    pub height: u32,
    /// Herbivores spawned at init
    pub herbivores: u32,
    /// Predators spawned at init
    pub predators: u32,
    /// Per-tile chance of starting with germinated vegetation
    pub vegetation_chance: f32,
    /// PRNG seed; equal seeds give equal runs
    pub seed: u64,
    /// Simulated seconds the demo runner executes before exiting
    pub run_seconds: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            herbivores: 40,
            predators: 3,
            vegetation_chance: 0.07,
            seed: 7,
            run_seconds: 120.0,
        }
    }
}

impl SimConfig {
    /// Load a config, picking the format from the file extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        ron::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// Errors that can occur while loading or saving a config
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Serialization or deserialization error
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sane() {
        let config = SimConfig::default();
        assert!(config.width > 0 && config.height > 0);
        assert!(config.herbivores > config.predators);
        assert!(config.vegetation_chance > 0.0 && config.vegetation_chance < 1.0);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = SimConfig {
            herbivores: 12,
            seed: 99,
            ..Default::default()
        };

        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: SimConfig = ron::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_round_trip_and_partial_fields() {
        let config = SimConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let loaded: SimConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded, config);

        // Unspecified fields fall back to defaults
        let partial: SimConfig = serde_json::from_str(r#"{"herbivores": 5}"#).unwrap();
        assert_eq!(partial.herbivores, 5);
        assert_eq!(partial.predators, SimConfig::default().predators);
    }
}
