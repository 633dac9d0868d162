//! Heart rate and variability extraction
//!
//! Converts detected peaks into RR intervals, an average BPM, and SDNN.

use tracing::{debug, warn};

use crate::peaks::detect_peaks;
use crate::types::RateResult;

/// Default peak threshold, relative to the signal maximum
pub const DEFAULT_RELATIVE_THRESHOLD: f64 = 0.7;

/// Physiological refractory period between beats (seconds)
pub const REFRACTORY_PERIOD_S: f64 = 0.2;

/// Extract the rate using the default threshold and an automatic refractory distance.
pub fn extract_rate(signal: &[f64], sample_rate_hz: f64) -> RateResult {
    extract_rate_with(signal, sample_rate_hz, DEFAULT_RELATIVE_THRESHOLD, 0)
}

/// Extract the rate with explicit detector parameters.
///
/// `min_distance == 0` means "unset" and derives the distance from the
/// refractory period. Empty input or a non-positive or non-finite sampling
/// rate yields an undefined (all-zero) result.
pub fn extract_rate_with(
    signal: &[f64],
    sample_rate_hz: f64,
    relative_threshold: f64,
    min_distance: usize,
) -> RateResult {
    let mut result = RateResult::default();

    if signal.is_empty() || !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
        warn!(
            samples = signal.len(),
            sample_rate_hz, "cannot estimate rate: empty signal or invalid sample rate"
        );
        return result;
    }

    let min_distance = if min_distance == 0 {
        auto_min_distance(sample_rate_hz)
    } else {
        min_distance
    };

    result.peak_indices = detect_peaks(signal, relative_threshold, min_distance);
    debug!(
        peaks = result.peak_indices.len(),
        min_distance, relative_threshold, "peak detection complete"
    );

    if result.peak_indices.len() < 2 {
        warn!(peaks = result.peak_indices.len(), "fewer than two peaks; rate undefined");
        return result;
    }

    result.rr_intervals_s = result
        .peak_indices
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 / sample_rate_hz)
        .collect();

    let mean_rr = mean(&result.rr_intervals_s);
    if mean_rr > 0.0 {
        result.bpm = 60.0 / mean_rr;
    }

    result
}

/// Refractory distance in samples: `max(1, floor(0.2 * fs))`
pub fn auto_min_distance(sample_rate_hz: f64) -> usize {
    ((REFRACTORY_PERIOD_S * sample_rate_hz).floor() as usize).max(1)
}

/// Population standard deviation of RR intervals (0 for an empty series)
pub fn sdnn(rr_intervals_s: &[f64]) -> f64 {
    if rr_intervals_s.is_empty() {
        return 0.0;
    }
    let m = mean(rr_intervals_s);
    let variance = rr_intervals_s.iter().map(|rr| (rr - m).powi(2)).sum::<f64>()
        / rr_intervals_s.len() as f64;
    variance.sqrt()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
