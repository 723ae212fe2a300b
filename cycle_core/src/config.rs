//! Configuration file support for Cycle Kit.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/cyclekit/config.toml`.

use crate::{
    CalendarDate, CycleParameters, Error, FertileWindowOffsets, Result, DEFAULT_CYCLE_LENGTH,
    DEFAULT_LUTEAL_PHASE, DEFAULT_PREDICTION_COUNT,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub prediction: PredictionConfig,

    #[serde(default)]
    pub notes: NotesConfig,
}

/// Defaults for the cycle settings form
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,

    #[serde(default = "default_luteal_phase")]
    pub luteal_phase: u32,

    #[serde(default = "default_prediction_count")]
    pub prediction_count: u32,

    #[serde(default = "default_days_before_ovulation")]
    pub days_before_ovulation: u32,

    #[serde(default = "default_days_after_ovulation")]
    pub days_after_ovulation: u32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            cycle_length: default_cycle_length(),
            luteal_phase: default_luteal_phase(),
            prediction_count: default_prediction_count(),
            days_before_ovulation: default_days_before_ovulation(),
            days_after_ovulation: default_days_after_ovulation(),
        }
    }
}

impl PredictionConfig {
    pub fn fertile_window(&self) -> FertileWindowOffsets {
        FertileWindowOffsets {
            days_before_ovulation: self.days_before_ovulation,
            days_after_ovulation: self.days_after_ovulation,
        }
    }

    /// Parameters starting at `start_date` with the configured defaults
    pub fn parameters(&self, start_date: CalendarDate) -> CycleParameters {
        CycleParameters {
            start_date,
            cycle_length: self.cycle_length,
            luteal_phase: self.luteal_phase,
            prediction_count: self.prediction_count,
            fertile_window: self.fertile_window(),
        }
    }
}

/// Notes plugin configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_note_max_length")]
    pub max_length: usize,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            max_length: default_note_max_length(),
        }
    }
}

// Default value functions
fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_luteal_phase() -> u32 {
    DEFAULT_LUTEAL_PHASE
}

fn default_prediction_count() -> u32 {
    DEFAULT_PREDICTION_COUNT
}

fn default_days_before_ovulation() -> u32 {
    FertileWindowOffsets::default().days_before_ovulation
}

fn default_days_after_ovulation() -> u32 {
    FertileWindowOffsets::default().days_after_ovulation
}

fn default_note_max_length() -> usize {
    500
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        base.join("cyclekit").join("config.toml")
    }

    /// Check that the configured defaults form valid cycle parameters
    ///
    /// The start date plays no part in the check.
    pub fn validate(&self) -> Result<()> {
        let defaults = self
            .prediction
            .parameters(CalendarDate::from_naive(chrono::NaiveDate::default()));
        let problems: Vec<String> = defaults.validate().iter().map(|e| e.to_string()).collect();

        if self.notes.max_length == 0 {
            return Err(Error::Config("notes.max_length must be positive".into()));
        }
        if !problems.is_empty() {
            return Err(Error::Config(format!(
                "invalid [prediction] defaults: {}",
                problems.join("; ")
            )));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.prediction.cycle_length, 28);
        assert_eq!(config.prediction.luteal_phase, 14);
        assert_eq!(config.prediction.days_before_ovulation, 5);
        assert_eq!(config.notes.max_length, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.prediction.prediction_count,
            parsed.prediction.prediction_count
        );
        assert_eq!(config.notes.max_length, parsed.notes.max_length);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[prediction]
days_before_ovulation = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.prediction.fertile_window(),
            FertileWindowOffsets {
                days_before_ovulation: 3,
                days_after_ovulation: 1,
            }
        );
        assert_eq!(config.prediction.cycle_length, 28); // default
    }

    #[test]
    fn test_invalid_defaults_rejected_on_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[prediction]\ncycle_length = 28\nluteal_phase = 24\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("luteal phase 24")));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.prediction.prediction_count = 6;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.prediction.prediction_count, 6);
    }
}
