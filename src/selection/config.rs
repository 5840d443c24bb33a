//! Configuration for the pair selection engine

use super::error::SelectionError;
use crate::types::Resolution;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for one selection engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of historical bars requested per cycle
    #[serde(default = "default_lookback")]
    pub lookback: usize,

    /// Sampling resolution of the requested history
    #[serde(default = "default_resolution")]
    pub resolution: Resolution,

    /// Minimum Pearson correlation a pair needs to be selected
    #[serde(default = "default_min_correlation")]
    pub min_correlation: f64,

    /// Ratio deviation threshold, passed through to the trading strategy.
    /// Not used by pair selection.
    #[serde(default = "default_ratio_threshold")]
    pub ratio_threshold: f64,
}

// Default value functions for serde
fn default_lookback() -> usize {
    252 // One trading year of daily bars
}
fn default_resolution() -> Resolution {
    Resolution::Daily
}
fn default_min_correlation() -> f64 {
    0.5
}
fn default_ratio_threshold() -> f64 {
    1.0
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            resolution: default_resolution(),
            min_correlation: default_min_correlation(),
            ratio_threshold: default_ratio_threshold(),
        }
    }
}

impl SelectionConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate().map_err(SelectionError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// `min_correlation` is conventionally in [0, 1] but any finite value is
    /// accepted.
    pub fn validate(&self) -> Result<(), String> {
        if self.lookback == 0 {
            return Err("lookback must be at least 1".to_string());
        }
        if !self.min_correlation.is_finite() {
            return Err(format!(
                "min_correlation must be finite, got {}",
                self.min_correlation
            ));
        }
        if !self.ratio_threshold.is_finite() || self.ratio_threshold <= 0.0 {
            return Err(format!(
                "ratio_threshold must be positive, got {}",
                self.ratio_threshold
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = SelectionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_correlation, 0.5);
        assert_eq!(config.resolution, Resolution::Daily);
    }

    #[test]
    fn test_zero_lookback_invalid() {
        let config = SelectionConfig {
            lookback: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_correlation_accepted() {
        let config = SelectionConfig {
            min_correlation: -0.25,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = SelectionConfig {
            min_correlation: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SelectionConfig =
            serde_json::from_str(r#"{"lookback": 30, "resolution": "hour"}"#).unwrap();
        assert_eq!(config.lookback, 30);
        assert_eq!(config.resolution, Resolution::Hour);
        assert_eq!(config.min_correlation, 0.5);
        assert_eq!(config.ratio_threshold, 1.0);
    }

    #[test]
    fn test_from_json_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"lookback": 0}"#).unwrap();

        let err = SelectionConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidConfig(_)));
    }
}
