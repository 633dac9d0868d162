//! Core types for the Synheart Pulse pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: the normalized time-domain signal, its spectrum, detected peaks,
//! the rate result and the anomaly report.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Frequency-domain representation. Index 0 is DC, index `N/2` is Nyquist.
pub type Spectrum = Vec<Complex64>;

/// Strictly increasing sample indices of accepted peaks.
pub type PeakSet = Vec<usize>;

/// Normalized single-channel recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Samples normalized to [-1.0, 1.0]
    pub samples: Vec<f64>,
    /// Sampling rate in Hz
    pub sample_rate_hz: f64,
}

impl Signal {
    pub fn new(samples: Vec<f64>, sample_rate_hz: f64) -> Self {
        Self {
            samples,
            sample_rate_hz,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recording duration in seconds (0 when the sampling rate is unusable)
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0 {
            self.samples.len() as f64 / self.sample_rate_hz
        } else {
            0.0
        }
    }
}

/// Heart rate estimate derived from one filtered signal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateResult {
    /// Average beats per minute, 0 when undefined
    pub bpm: f64,
    /// Inter-beat (RR) intervals in seconds, in detection order
    pub rr_intervals_s: Vec<f64>,
    /// Peaks the intervals were derived from
    pub peak_indices: PeakSet,
}

impl RateResult {
    /// True when the result carries no usable rate
    pub fn is_undefined(&self) -> bool {
        self.bpm == 0.0 || self.rr_intervals_s.is_empty()
    }
}

/// Rule-based rhythm flags plus human-readable alerts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub bradycardia: bool,
    pub tachycardia: bool,
    pub irregular_rhythm: bool,
    /// Alerts in rule-evaluation order; never empty once classified
    pub alerts: Vec<String>,
}

impl AnomalyReport {
    pub fn has_anomaly(&self) -> bool {
        self.bradycardia || self.tachycardia || self.irregular_rhythm
    }
}

/// Quality flag describing how far a recording could be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    EmptySignal,
    InvalidSampleRate,
    ZeroPadded,
    InsufficientPeaks,
    LowAmplitude,
}

/// Everything the pipeline produces for one recording
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Band-limited spectrum of the zero-padded input
    pub spectrum_filtered: Spectrum,
    /// Filtered time-domain signal, truncated to the input length
    pub filtered_signal: Signal,
    pub rate: RateResult,
    pub anomalies: AnomalyReport,
    /// Transform length after zero-padding
    pub padded_len: usize,
    pub quality_flags: Vec<QualityFlag>,
}
