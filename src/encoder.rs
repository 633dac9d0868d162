//! Report encoding
//!
//! This module encodes pipeline output into JSON reports carrying producer and
//! provenance metadata alongside the rate and anomaly results.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ComputeError;
use crate::rate::sdnn;
use crate::types::{PipelineOutput, QualityFlag, Signal};
use crate::{PRODUCER_NAME, PULSE_VERSION};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Where a recording came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Caller-supplied label, usually the input file name
    pub source: String,
    pub sample_rate_hz: f64,
    pub sample_count: usize,
    /// Recording length in seconds (0 when the sampling rate is unusable)
    pub duration_s: f64,
    /// Transform length after zero-padding
    pub padded_len: usize,
}

impl Provenance {
    pub fn for_signal(source: &str, signal: &Signal, padded_len: usize) -> Self {
        Self {
            source: source.to_string(),
            sample_rate_hz: signal.sample_rate_hz,
            sample_count: signal.len(),
            duration_s: signal.duration_secs(),
            padded_len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRate {
    pub bpm: f64,
    pub rr_intervals_s: Vec<f64>,
    pub peak_indices: Vec<usize>,
    pub interval_count: usize,
    /// Population SDNN in seconds
    pub sdnn_s: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAnomalies {
    pub bradycardia: bool,
    pub tachycardia: bool,
    pub irregular_rhythm: bool,
    pub alerts: Vec<String>,
}

/// Serialized result for one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: Provenance,
    pub computed_at_utc: String,
    pub rate: ReportRate,
    pub anomalies: ReportAnomalies,
    pub quality_flags: Vec<QualityFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_signal: Option<Vec<f64>>,
}

/// Report encoder for producing JSON payloads
#[derive(Debug, Clone)]
pub struct ReportEncoder {
    instance_id: String,
    include_signal: bool,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            include_signal: false,
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            instance_id,
            include_signal: false,
        }
    }

    /// Include the filtered time-domain signal in reports
    pub fn with_signal(mut self, include: bool) -> Self {
        self.include_signal = include;
        self
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode pipeline output into a report
    pub fn encode(&self, output: &PipelineOutput, provenance: &Provenance) -> PulseReport {
        let rate = &output.rate;
        let anomalies = &output.anomalies;

        PulseReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: PULSE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            provenance: provenance.clone(),
            computed_at_utc: Utc::now().to_rfc3339(),
            rate: ReportRate {
                bpm: rate.bpm,
                rr_intervals_s: rate.rr_intervals_s.clone(),
                peak_indices: rate.peak_indices.clone(),
                interval_count: rate.rr_intervals_s.len(),
                sdnn_s: sdnn(&rate.rr_intervals_s),
            },
            anomalies: ReportAnomalies {
                bradycardia: anomalies.bradycardia,
                tachycardia: anomalies.tachycardia,
                irregular_rhythm: anomalies.irregular_rhythm,
                alerts: anomalies.alerts.clone(),
            },
            quality_flags: output.quality_flags.clone(),
            filtered_signal: self
                .include_signal
                .then(|| output.filtered_signal.samples.clone()),
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        output: &PipelineOutput,
        provenance: &Provenance,
    ) -> Result<String, ComputeError> {
        let report = self.encode(output, provenance);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}
