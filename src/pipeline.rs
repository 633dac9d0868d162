//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Pulse.
//! It composes the stages from a normalized signal to a rate and anomaly report.

use std::path::Path;

use tracing::{debug, warn};

use crate::anomaly::classify;
use crate::config::PipelineConfig;
use crate::decoder::decode_wav;
use crate::encoder::{Provenance, ReportEncoder};
use crate::error::ComputeError;
use crate::rate::extract_rate_with;
use crate::transform::{ifft_real, spectrum_for_filtering};
use crate::types::{PipelineOutput, QualityFlag, Signal};

/// Run the full pipeline with the default heart-rate configuration.
///
/// Pipeline stages:
/// 1. Zero-pad to the next power of two and transform
/// 2. Band-pass filter the spectrum (0.5–3.5 Hz)
/// 3. Inverse transform, truncated to the input length
/// 4. Peak detection and rate extraction
/// 5. Anomaly classification
///
/// # Example
/// ```ignore
/// let output = run_pipeline(&Signal::new(samples, 1000.0))?;
/// println!("{:.1} BPM", output.rate.bpm);
/// ```
pub fn run_pipeline(signal: &Signal) -> Result<PipelineOutput, ComputeError> {
    run_pipeline_with(signal, &PipelineConfig::default())
}

/// Run the full pipeline with explicit parameters.
pub fn run_pipeline_with(
    signal: &Signal,
    config: &PipelineConfig,
) -> Result<PipelineOutput, ComputeError> {
    let fs = signal.sample_rate_hz;
    let mut quality_flags = Vec::new();

    if signal.is_empty() {
        quality_flags.push(QualityFlag::EmptySignal);
    }
    if !(fs.is_finite() && fs > 0.0) {
        quality_flags.push(QualityFlag::InvalidSampleRate);
    }

    // Stage 1: zero-pad and transform
    let mut spectrum = spectrum_for_filtering(&signal.samples)?;
    let padded_len = spectrum.len();
    if padded_len != signal.len() && !signal.is_empty() {
        quality_flags.push(QualityFlag::ZeroPadded);
    }
    debug!(samples = signal.len(), padded_len, "forward transform complete");

    // Stage 2: band-pass
    let band = config.band();
    band.apply(&mut spectrum, fs);
    debug!(
        low_hz = band.low_hz,
        high_hz = band.high_hz,
        retained_bins = band.retained_bins(padded_len, fs),
        "spectrum filtered"
    );

    // Stage 3: back to the time domain, dropping the padding
    let mut filtered = ifft_real(&spectrum)?;
    filtered.truncate(signal.len());

    if !filtered.is_empty() && filtered.iter().copied().fold(f64::NEG_INFINITY, f64::max) <= 0.0 {
        quality_flags.push(QualityFlag::LowAmplitude);
    }

    // Stage 4: rate
    let rate = extract_rate_with(&filtered, fs, config.relative_threshold, config.min_distance);
    let evaluable = !quality_flags
        .iter()
        .any(|f| matches!(f, QualityFlag::EmptySignal | QualityFlag::InvalidSampleRate));
    if evaluable && rate.peak_indices.len() < 2 {
        quality_flags.push(QualityFlag::InsufficientPeaks);
    }

    // Stage 5: anomalies
    let anomalies = classify(&rate);
    if rate.is_undefined() {
        warn!(?quality_flags, "recording could not be evaluated");
    } else {
        debug!(bpm = rate.bpm, intervals = rate.rr_intervals_s.len(), "rate extracted");
    }

    Ok(PipelineOutput {
        spectrum_filtered: spectrum,
        filtered_signal: Signal::new(filtered, fs),
        rate,
        anomalies,
        padded_len,
        quality_flags,
    })
}

/// Configured processor bundling the pipeline with a report encoder.
///
/// Holds no mutable state between calls; clone it to process recordings on
/// several threads.
#[derive(Debug, Clone)]
pub struct PulseProcessor {
    config: PipelineConfig,
    encoder: ReportEncoder,
}

impl Default for PulseProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a processor with a validated configuration
    pub fn with_config(config: PipelineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    /// Replace the report encoder
    pub fn with_encoder(mut self, encoder: ReportEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn encoder(&self) -> &ReportEncoder {
        &self.encoder
    }

    /// Run the pipeline on one signal
    pub fn analyze(&self, signal: &Signal) -> Result<PipelineOutput, ComputeError> {
        run_pipeline_with(signal, &self.config)
    }

    /// Run the pipeline and encode the result as a JSON report
    pub fn analyze_to_json(&self, signal: &Signal, source: &str) -> Result<String, ComputeError> {
        let output = self.analyze(signal)?;
        let provenance = Provenance::for_signal(source, signal, output.padded_len);
        self.encoder.encode_to_json(&output, &provenance)
    }

    /// Decode a mono 16-bit WAV file and analyze it
    pub fn analyze_wav(&self, path: &Path) -> Result<(Signal, PipelineOutput), ComputeError> {
        let signal = decode_wav(path)?;
        let output = self.analyze(&signal)?;
        Ok((signal, output))
    }

    /// Analyze several recordings; each entry succeeds or fails on its own
    pub fn analyze_batch(&self, signals: &[Signal]) -> Vec<Result<PipelineOutput, ComputeError>> {
        signals.iter().map(|s| self.analyze(s)).collect()
    }
}
