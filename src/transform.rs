//! Radix-2 Fourier transform
//!
//! Recursive Cooley–Tukey forward transform and the matching inverse. Both
//! require a power-of-two length; callers zero-pad with [`next_power_of_two`]
//! first (see [`spectrum_for_filtering`]).

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::ComputeError;
use crate::types::Spectrum;

/// Forward transform.
///
/// Lengths 0 and 1 are returned unchanged. Any other length that is not a
/// power of two fails with [`ComputeError::InvalidLength`].
pub fn fft(x: &[Complex64]) -> Result<Spectrum, ComputeError> {
    let n = x.len();
    if n <= 1 {
        return Ok(x.to_vec());
    }
    if !n.is_power_of_two() {
        return Err(ComputeError::InvalidLength(n));
    }
    Ok(fft_recursive(x))
}

// Length is a validated power of two from here on.
fn fft_recursive(x: &[Complex64]) -> Spectrum {
    let n = x.len();
    if n <= 1 {
        return x.to_vec();
    }

    let half = n / 2;
    let even: Vec<Complex64> = x.iter().step_by(2).copied().collect();
    let odd: Vec<Complex64> = x.iter().skip(1).step_by(2).copied().collect();

    let fe = fft_recursive(&even);
    let fo = fft_recursive(&odd);

    let mut out = vec![Complex64::new(0.0, 0.0); n];
    for k in 0..half {
        let wk = Complex64::from_polar(1.0, -2.0 * PI * k as f64 / n as f64);
        let t = wk * fo[k];
        out[k] = fe[k] + t;
        out[k + half] = fe[k] - t;
    }
    out
}

/// Forward transform of a real sequence (imaginary parts set to zero).
pub fn fft_real(x: &[f64]) -> Result<Spectrum, ComputeError> {
    let lifted: Vec<Complex64> = x.iter().map(|&re| Complex64::new(re, 0.0)).collect();
    fft(&lifted)
}

/// Inverse transform via the conjugate trick: conj → forward → conj → / N.
pub fn ifft(spectrum: &[Complex64]) -> Result<Spectrum, ComputeError> {
    let n = spectrum.len();
    if n <= 1 {
        return Ok(spectrum.to_vec());
    }
    if !n.is_power_of_two() {
        return Err(ComputeError::InvalidLength(n));
    }

    let conjugated: Vec<Complex64> = spectrum.iter().map(|c| c.conj()).collect();
    let scale = n as f64;
    Ok(fft_recursive(&conjugated)
        .into_iter()
        .map(|c| c.conj() / scale)
        .collect())
}

/// Inverse transform keeping only real parts.
///
/// The imaginary residue is numerically negligible for Hermitian-symmetric
/// input and is discarded.
pub fn ifft_real(spectrum: &[Complex64]) -> Result<Vec<f64>, ComputeError> {
    Ok(ifft(spectrum)?.into_iter().map(|c| c.re).collect())
}

/// Smallest power of two that is >= `n` (1 for `n == 0`).
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Zero-pad a real signal to the next power of two and transform it.
pub fn spectrum_for_filtering(samples: &[f64]) -> Result<Spectrum, ComputeError> {
    let n_fft = next_power_of_two(samples.len());
    let mut padded = samples.to_vec();
    padded.resize(n_fft, 0.0);
    fft_real(&padded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn naive_dft(x: &[f64]) -> Vec<Complex64> {
        let n = x.len();
        (0..n)
            .map(|k| {
                x.iter()
                    .enumerate()
                    .map(|(t, &v)| {
                        Complex64::from_polar(v, -2.0 * PI * (k * t) as f64 / n as f64)
                    })
                    .sum::<Complex64>()
            })
            .collect()
    }

    #[test]
    fn test_round_trip_small() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let back = ifft_real(&fft_real(&x).unwrap()).unwrap();

        assert_eq!(back.len(), x.len());
        for (a, b) in x.iter().zip(back.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_round_trip_long_signal() {
        let x: Vec<f64> = (0..1024)
            .map(|i| (i as f64 * 0.37).sin() * 0.8 + (i as f64 * 0.011).cos() * 0.1)
            .collect();
        let back = ifft_real(&fft_real(&x).unwrap()).unwrap();

        for (a, b) in x.iter().zip(back.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let x = vec![Complex64::new(1.0, 0.0); 3];

        assert!(matches!(fft(&x), Err(ComputeError::InvalidLength(3))));
        assert!(matches!(ifft(&x), Err(ComputeError::InvalidLength(3))));
    }

    #[test]
    fn test_accepts_power_of_two_lengths() {
        for n in [0usize, 1, 2, 4, 1024] {
            let x = vec![Complex64::new(0.5, 0.0); n];
            let out = fft(&x).unwrap();
            assert_eq!(out.len(), n);
        }
    }

    #[test]
    fn test_single_element_is_identity() {
        let x = vec![Complex64::new(0.25, -1.0)];
        assert_eq!(fft(&x).unwrap(), x);
        assert_eq!(ifft(&x).unwrap(), x);
    }

    #[test]
    fn test_matches_direct_dft() {
        let x = [0.3, -0.1, 0.7, 0.0, -0.5, 0.9, 0.2, -0.8];
        let fast = fft_real(&x).unwrap();
        let slow = naive_dft(&x);

        for (a, b) in fast.iter().zip(slow.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-9);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_real_input_is_hermitian() {
        let x: Vec<f64> = (0..64).map(|i| ((i * 7) % 11) as f64 / 11.0 - 0.5).collect();
        let spectrum = fft_real(&x).unwrap();
        let n = spectrum.len();

        for i in 1..n / 2 {
            let mirror = spectrum[n - i].conj();
            assert_abs_diff_eq!(spectrum[i].re, mirror.re, epsilon = 1e-9);
            assert_abs_diff_eq!(spectrum[i].im, mirror.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pure_tone_lands_in_its_bin() {
        let n = 128;
        let bin = 9;
        let x: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * bin as f64 * i as f64 / n as f64).cos())
            .collect();
        let spectrum = fft_real(&x).unwrap();

        let (peak, _) = spectrum[..n / 2]
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.norm().partial_cmp(&b.norm()).unwrap())
            .unwrap();
        assert_eq!(peak, bin);
        assert_abs_diff_eq!(spectrum[bin].norm(), n as f64 / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_next_power_of_two() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(100), 128);
        assert_eq!(next_power_of_two(256), 256);
        assert_eq!(next_power_of_two(257), 512);
        // largest power of two a usize can hold
        let top = usize::MAX / 2 + 1;
        assert_eq!(next_power_of_two(top / 2 + 1), top);
        assert_eq!(next_power_of_two(top), top);
    }

    #[test]
    fn test_spectrum_for_filtering_pads() {
        let spectrum = spectrum_for_filtering(&[1.0; 100]).unwrap();
        assert_eq!(spectrum.len(), 128);
        // DC bin sums the original samples; padding contributes nothing
        assert_abs_diff_eq!(spectrum[0].re, 100.0, epsilon = 1e-9);

        assert_eq!(spectrum_for_filtering(&[]).unwrap().len(), 1);
    }
}
