//! Rhythm anomaly classification
//!
//! Fixed-threshold rules over a [`RateResult`]. These are screening flags, not
//! a diagnostic model.

use std::fmt;

use crate::rate::sdnn;
use crate::types::{AnomalyReport, RateResult};

/// Below this average rate the recording is flagged as bradycardia
pub const BRADYCARDIA_BPM: f64 = 60.0;

/// Above this average rate the recording is flagged as tachycardia
pub const TACHYCARDIA_BPM: f64 = 100.0;

/// SDNN above this many seconds is flagged as an irregular rhythm
pub const IRREGULAR_SDNN_S: f64 = 0.10;

/// Alert categories, in rule-evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    InsufficientData,
    Bradycardia,
    Tachycardia,
    IrregularRhythm,
    Normal,
}

impl AnomalyKind {
    pub fn message(&self) -> &'static str {
        match self {
            AnomalyKind::InsufficientData => "insufficient data to evaluate anomalies",
            AnomalyKind::Bradycardia => "bradycardia detected (BPM < 60)",
            AnomalyKind::Tachycardia => "tachycardia detected (BPM > 100)",
            AnomalyKind::IrregularRhythm => "irregular rhythm (SDNN > 0.10 s)",
            AnomalyKind::Normal => "no anomalies detected",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Classify a rate result.
///
/// Undefined rates short-circuit to a single "insufficient data" alert.
/// Otherwise the rules fire independently and accumulate alerts.
pub fn classify(rate: &RateResult) -> AnomalyReport {
    let mut report = AnomalyReport::default();

    if rate.is_undefined() {
        report.alerts.push(AnomalyKind::InsufficientData.to_string());
        return report;
    }

    if rate.bpm < BRADYCARDIA_BPM {
        report.bradycardia = true;
        report.alerts.push(AnomalyKind::Bradycardia.to_string());
    }
    if rate.bpm > TACHYCARDIA_BPM {
        report.tachycardia = true;
        report.alerts.push(AnomalyKind::Tachycardia.to_string());
    }
    if sdnn(&rate.rr_intervals_s) > IRREGULAR_SDNN_S {
        report.irregular_rhythm = true;
        report.alerts.push(AnomalyKind::IrregularRhythm.to_string());
    }

    if report.alerts.is_empty() {
        report.alerts.push(AnomalyKind::Normal.to_string());
    }

    report
}
