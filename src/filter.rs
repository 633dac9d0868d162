//! Spectral band-pass filter
//!
//! Zeroes every bin whose frequency lies outside the configured band. The
//! mirror bin `N - i` is cleared together with bin `i` so the spectrum stays
//! Hermitian and the inverse transform stays real.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Lower edge of the heart-rate band (30 BPM)
pub const HEART_RATE_LOW_HZ: f64 = 0.5;

/// Upper edge of the heart-rate band (210 BPM)
pub const HEART_RATE_HIGH_HZ: f64 = 3.5;

/// Inclusive frequency band in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPass {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl Default for BandPass {
    fn default() -> Self {
        Self::heart_rate()
    }
}

impl BandPass {
    pub fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// Physiological heart-rate band, 0.5–3.5 Hz
    pub fn heart_rate() -> Self {
        Self::new(HEART_RATE_LOW_HZ, HEART_RATE_HIGH_HZ)
    }

    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.low_hz && freq_hz <= self.high_hz
    }

    /// Filter `spectrum` in place
    pub fn apply(&self, spectrum: &mut [Complex64], sample_rate_hz: f64) {
        filter_band(spectrum, sample_rate_hz, self.low_hz, self.high_hz);
    }

    /// Number of bins in `[0, N/2]` a spectrum of length `n` keeps
    pub fn retained_bins(&self, n: usize, sample_rate_hz: f64) -> usize {
        if n == 0 {
            return 0;
        }
        (0..=n / 2)
            .filter(|&i| self.contains(bin_frequency(i, n, sample_rate_hz)))
            .count()
    }
}

/// Frequency in Hz of bin `i` in an `n`-point transform
pub fn bin_frequency(i: usize, n: usize, sample_rate_hz: f64) -> f64 {
    i as f64 * sample_rate_hz / n as f64
}

/// Zero all bins outside `[low_hz, high_hz]`, keeping Hermitian symmetry.
pub fn filter_band(spectrum: &mut [Complex64], sample_rate_hz: f64, low_hz: f64, high_hz: f64) {
    let n = spectrum.len();
    if n == 0 {
        return;
    }

    let zero = Complex64::new(0.0, 0.0);
    for i in 0..=n / 2 {
        let freq = bin_frequency(i, n, sample_rate_hz);
        if freq < low_hz || freq > high_hz {
            spectrum[i] = zero;
            if i != 0 && i != n / 2 {
                spectrum[n - i] = zero;
            }
        }
    }
}
