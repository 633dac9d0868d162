//! Synthetic pulse recordings
//!
//! Deterministic Gaussian beat trains for smoke tests and the CLI `synth`
//! command.

use crate::types::Signal;

/// Gaussian beat width (standard deviation, seconds)
const BEAT_WIDTH_S: f64 = 0.03;

/// Beat peak amplitude
const BEAT_AMPLITUDE: f64 = 0.8;

/// Gaussian beats at `bpm`, with deterministic interval variation scaled by `jitter`.
///
/// The first beat lands half an interval in. With `jitter == 0` every interval
/// is exactly `60 / bpm` seconds.
pub fn synth_pulse(bpm: f64, seconds: f64, sample_rate_hz: f64, jitter: f64) -> Signal {
    let n = (seconds * sample_rate_hz) as usize;
    let base_interval = 60.0 / bpm;
    let mut samples = vec![0.0; n];

    let mut beat = base_interval / 2.0;
    let mut k = 0u32;
    while beat < seconds {
        let lo = ((beat - 4.0 * BEAT_WIDTH_S) * sample_rate_hz).max(0.0) as usize;
        let hi = (((beat + 4.0 * BEAT_WIDTH_S) * sample_rate_hz) as usize).min(n);
        for (i, s) in samples.iter_mut().enumerate().take(hi).skip(lo) {
            let t = i as f64 / sample_rate_hz - beat;
            *s += BEAT_AMPLITUDE * (-(t * t) / (2.0 * BEAT_WIDTH_S * BEAT_WIDTH_S)).exp();
        }
        // golden-angle phase keeps the variation aperiodic
        let variation = jitter * (k as f64 * 2.399_963).sin();
        beat += base_interval * (1.0 + variation);
        k += 1;
    }

    Signal::new(samples, sample_rate_hz)
}
