//! Synheart Pulse - On-device heart rate extraction from pulse audio
//!
//! Pulse turns a normalized single-channel recording into a heart rate estimate
//! and rhythm flags through a deterministic pipeline: zero-padding → FFT →
//! band-pass filter → inverse FFT → peak detection → rate/variability
//! extraction → anomaly classification.
//!
//! ## Modules
//!
//! - **Core**: `transform`, `filter`, `peaks`, `rate`, `anomaly`
//! - **Orchestration**: `pipeline`, `config`
//! - **Boundaries**: `decoder` (WAV input), `encoder` (JSON reports), `ffi`
//! - **Fixtures**: `synth` (synthetic beat trains)

pub mod anomaly;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod peaks;
pub mod pipeline;
pub mod rate;
pub mod synth;
pub mod transform;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use anomaly::classify;
pub use config::PipelineConfig;
pub use error::ComputeError;
pub use filter::{filter_band, BandPass};
pub use peaks::detect_peaks;
pub use pipeline::{run_pipeline, run_pipeline_with, PulseProcessor};
pub use rate::{extract_rate, extract_rate_with};
pub use transform::{fft, fft_real, ifft, ifft_real, next_power_of_two};
pub use types::{AnomalyReport, PipelineOutput, QualityFlag, RateResult, Signal, Spectrum};

/// Pulse version embedded in all reports
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "synheart-pulse";
