//! Pipeline configuration
//!
//! Detector and filter parameters, loadable from JSON. Unset fields take the
//! heart-rate defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ComputeError;
use crate::filter::{BandPass, HEART_RATE_HIGH_HZ, HEART_RATE_LOW_HZ};
use crate::rate::DEFAULT_RELATIVE_THRESHOLD;

/// Parameters for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lower edge of the passband (Hz)
    pub low_hz: f64,
    /// Upper edge of the passband (Hz)
    pub high_hz: f64,
    /// Peak threshold as a fraction of the filtered signal maximum
    pub relative_threshold: f64,
    /// Minimum samples between peaks; 0 derives it from the refractory period
    pub min_distance: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            low_hz: HEART_RATE_LOW_HZ,
            high_hz: HEART_RATE_HIGH_HZ,
            relative_threshold: DEFAULT_RELATIVE_THRESHOLD,
            min_distance: 0,
        }
    }
}

impl PipelineConfig {
    pub fn band(&self) -> BandPass {
        BandPass::new(self.low_hz, self.high_hz)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self, ComputeError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if !self.low_hz.is_finite() || !self.high_hz.is_finite() {
            return Err(ComputeError::InvalidConfig(
                "band edges must be finite".to_string(),
            ));
        }
        if self.low_hz < 0.0 {
            return Err(ComputeError::InvalidConfig(format!(
                "low_hz must be non-negative, got {}",
                self.low_hz
            )));
        }
        if self.low_hz >= self.high_hz {
            return Err(ComputeError::InvalidConfig(format!(
                "low_hz ({}) must be below high_hz ({})",
                self.low_hz, self.high_hz
            )));
        }
        if !(self.relative_threshold > 0.0 && self.relative_threshold <= 1.0) {
            return Err(ComputeError::InvalidConfig(format!(
                "relative_threshold must be in (0, 1], got {}",
                self.relative_threshold
            )));
        }
        Ok(())
    }
}
