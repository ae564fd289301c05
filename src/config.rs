//! TOML engine configuration.
//!
//! Lives at `<config dir>/cykel/engine.toml`. Every field is optional; a
//! missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calendar::DEFAULT_HORIZON;
use crate::models::RollingStats;

const MAX_HORIZON: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default = "default_cycle_length")]
    pub default_cycle_length: u32,
    #[serde(default = "default_period_length")]
    pub default_period_length: u32,
    #[serde(default = "default_projection_horizon")]
    pub projection_horizon: usize,
    #[serde(default = "default_export_horizon")]
    pub export_horizon: usize,
    #[serde(default = "default_symptom_lookback_days")]
    pub symptom_lookback_days: u32,
}

fn default_cycle_length() -> u32 {
    RollingStats::DEFAULT_CYCLE_LENGTH
}
fn default_period_length() -> u32 {
    RollingStats::DEFAULT_PERIOD_LENGTH
}
fn default_projection_horizon() -> usize {
    DEFAULT_HORIZON
}
fn default_export_horizon() -> usize {
    6
}
fn default_symptom_lookback_days() -> u32 {
    7
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_cycle_length: default_cycle_length(),
            default_period_length: default_period_length(),
            projection_horizon: default_projection_horizon(),
            export_horizon: default_export_horizon(),
            symptom_lookback_days: default_symptom_lookback_days(),
        }
    }
}

impl EngineConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cykel").join("engine.toml"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        Ok(config.clamped())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Fallback averages for a record set with no stored values.
    pub fn default_stats(&self) -> RollingStats {
        RollingStats {
            avg_cycle_length: self.default_cycle_length,
            avg_period_length: self.default_period_length,
        }
    }

    fn clamped(mut self) -> Self {
        let stats = self.default_stats().clamped();
        self.default_cycle_length = stats.avg_cycle_length;
        self.default_period_length = stats.avg_period_length;
        self.projection_horizon = self.projection_horizon.clamp(1, MAX_HORIZON);
        self.export_horizon = self.export_horizon.clamp(1, MAX_HORIZON);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn values_are_clamped() {
        let config = EngineConfig::from_toml_str(
            "default_cycle_length = 90\ndefault_period_length = 0\nprojection_horizon = 40\n",
        )
        .unwrap();
        assert_eq!(config.default_cycle_length, 45);
        // Zero means unset.
        assert_eq!(config.default_period_length, 5);
        assert_eq!(config.projection_horizon, 12);
        assert_eq!(config.export_horizon, 6);
    }

    #[test]
    fn long_default_period_is_clamped() {
        let config = EngineConfig::from_toml_str("default_period_length = 30\n").unwrap();
        assert_eq!(config.default_period_length, 14);
    }

    #[test]
    fn load_reads_file_or_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        assert_eq!(EngineConfig::load(&path).unwrap(), EngineConfig::default());

        fs::write(&path, "symptom_lookback_days = 14\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.symptom_lookback_days, 14);
        assert_eq!(config.default_stats(), RollingStats::default());
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(matches!(
            EngineConfig::from_toml_str("projection_horizon = \"three\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn default_path_ends_with_file_name() {
        if let Some(path) = EngineConfig::default_path() {
            assert!(path.ends_with("cykel/engine.toml"));
        }
    }
}
