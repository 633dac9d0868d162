//! Peak detection
//!
//! Finds strict local maxima above a threshold relative to the signal maximum,
//! enforcing a minimum spacing (refractory period) between accepted peaks.

use crate::types::PeakSet;

/// Detect peaks in a filtered signal.
///
/// A sample `i` in `1..len-1` is a candidate when it is strictly above
/// `max(signal) * relative_threshold` and strictly above both neighbours. A
/// candidate closer than `min_distance` samples to the last *accepted* peak is
/// dropped; a gap of exactly `min_distance` is accepted.
pub fn detect_peaks(signal: &[f64], relative_threshold: f64, min_distance: usize) -> PeakSet {
    let mut peaks = PeakSet::new();
    if signal.len() < 3 {
        return peaks;
    }

    let max_value = signal.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let threshold = max_value * relative_threshold;

    for i in 1..signal.len() - 1 {
        let value = signal[i];
        let is_candidate = value > threshold && value > signal[i - 1] && value > signal[i + 1];
        if !is_candidate {
            continue;
        }

        let spaced = peaks.last().map_or(true, |&last| i - last >= min_distance);
        if spaced {
            peaks.push(i);
        }
    }

    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finds_local_maxima() {
        let signal = [0.1, 0.5, 0.3, 0.8, 0.2, 0.9, 0.1];
        let peaks = detect_peaks(&signal, 0.5, 1);

        assert!(peaks.len() >= 2);
        assert!(peaks.contains(&3));
        assert!(peaks.contains(&5));
        // 0.5 is above the 0.45 threshold too
        assert_eq!(peaks, vec![1, 3, 5]);
    }

    #[test]
    fn test_empty_and_short_inputs() {
        assert!(detect_peaks(&[], 0.5, 1).is_empty());
        assert!(detect_peaks(&[1.0], 0.5, 1).is_empty());
        assert!(detect_peaks(&[0.0, 1.0], 0.5, 1).is_empty());
    }

    #[test]
    fn test_endpoints_never_peaks() {
        let signal = [1.0, 0.2, 0.1, 0.2, 1.0];
        assert!(detect_peaks(&signal, 0.1, 1).is_empty());
    }

    #[test]
    fn test_pathological_shapes() {
        let constant = vec![0.5; 32];
        assert!(detect_peaks(&constant, 0.5, 1).is_empty());

        let ramp: Vec<f64> = (0..32).map(|i| i as f64).collect();
        assert!(detect_peaks(&ramp, 0.5, 1).is_empty());
    }

    #[test]
    fn test_plateau_is_not_strict_maximum() {
        let signal = [0.0, 1.0, 1.0, 0.0];
        assert!(detect_peaks(&signal, 0.5, 1).is_empty());
    }

    #[test]
    fn test_refractory_measured_from_last_accepted() {
        // candidates at 2, 4, 6, 8
        let signal = [0.0, 0.1, 1.0, 0.1, 1.0, 0.1, 1.0, 0.1, 1.0, 0.0];

        // 4 is rejected (2 < 3), 6 is accepted relative to 2 (4 >= 3)
        assert_eq!(detect_peaks(&signal, 0.5, 3), vec![2, 6]);
        // exactly min_distance apart is accepted
        assert_eq!(detect_peaks(&signal, 0.5, 2), vec![2, 4, 6, 8]);
        assert_eq!(detect_peaks(&signal, 0.5, 4), vec![2, 6]);
        assert_eq!(detect_peaks(&signal, 0.5, 5), vec![2, 8]);
    }

    #[test]
    fn test_threshold_is_strict() {
        // max 1.0 * 0.5 = 0.5; the 0.5 bump must not count
        let signal = [0.0, 0.5, 0.0, 1.0, 0.0];
        assert_eq!(detect_peaks(&signal, 0.5, 1), vec![3]);
    }

    #[test]
    fn test_spacing_invariant_holds() {
        let signal: Vec<f64> = (0..2000)
            .map(|i| (i as f64 * 0.09).sin() + 0.3 * (i as f64 * 0.71).sin())
            .collect();

        for min_distance in [1usize, 10, 35, 80] {
            let peaks = detect_peaks(&signal, 0.3, min_distance);
            assert!(peaks.windows(2).all(|w| w[1] - w[0] >= min_distance));
            assert!(peaks.windows(2).all(|w| w[1] > w[0]));
        }
    }
}
