//! End-to-end tests: WAV bytes in, rate and anomaly report out.

use std::f64::consts::PI;
use std::thread;

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use synheart_pulse::decoder::{decode_wav, decode_wav_bytes, encode_wav_bytes, write_wav};
use synheart_pulse::synth::synth_pulse;
use synheart_pulse::transform::{fft_real, ifft};
use synheart_pulse::{
    filter_band, run_pipeline, run_pipeline_with, PipelineConfig, PulseProcessor, QualityFlag,
    Signal,
};

#[test]
fn impulse_train_yields_plausible_rate() {
    let mut samples = vec![0.0; 1000];
    for i in (0..1000).step_by(100) {
        samples[i] = 1.0;
    }
    let config = PipelineConfig {
        relative_threshold: 0.5,
        min_distance: 50,
        ..Default::default()
    };

    let output = run_pipeline_with(&Signal::new(samples, 1000.0), &config).unwrap();

    assert!(output.rate.bpm > 0.0 && output.rate.bpm < 200.0, "bpm {}", output.rate.bpm);
    assert!(output
        .rate
        .peak_indices
        .windows(2)
        .all(|w| w[1] - w[0] >= 50));
}

#[test]
fn regular_72_bpm_recording_from_wav() {
    let bytes = encode_wav_bytes(&synth_pulse(72.0, 10.0, 500.0, 0.0)).unwrap();
    let signal = decode_wav_bytes(&bytes).unwrap();
    let output = run_pipeline(&signal).unwrap();

    assert_eq!(signal.len(), 5000);
    assert_abs_diff_eq!(output.rate.bpm, 72.0, epsilon = 1.5);
    assert!(!output.anomalies.has_anomaly());
    assert_eq!(output.anomalies.alerts, vec!["no anomalies detected".to_string()]);
}

#[test]
fn slow_recording_is_bradycardia() {
    let output = run_pipeline(&synth_pulse(50.0, 10.0, 500.0, 0.0)).unwrap();

    assert_abs_diff_eq!(output.rate.bpm, 50.0, epsilon = 1.5);
    assert!(output.anomalies.bradycardia);
    assert!(!output.anomalies.irregular_rhythm);
}

#[test]
fn fast_recording_is_tachycardia() {
    let output = run_pipeline(&synth_pulse(130.0, 10.0, 500.0, 0.0)).unwrap();

    assert_abs_diff_eq!(output.rate.bpm, 130.0, epsilon = 2.0);
    assert!(output.anomalies.tachycardia);
}

#[test]
fn jittered_recording_is_irregular() {
    let output = run_pipeline(&synth_pulse(72.0, 10.0, 500.0, 0.25)).unwrap();

    assert!(output.anomalies.irregular_rhythm);
    assert!(output
        .anomalies
        .alerts
        .iter()
        .any(|a| a.contains("irregular rhythm")));
}

#[test]
fn wav_file_round_trip_through_processor() {
    let path = std::env::temp_dir().join(format!("pulse-{}.wav", Uuid::new_v4()));
    write_wav(&path, &synth_pulse(72.0, 10.0, 500.0, 0.0)).unwrap();

    let decoded = decode_wav(&path).unwrap();
    let (signal, output) = PulseProcessor::new().analyze_wav(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(signal, decoded);
    assert_eq!(signal.sample_rate_hz, 500.0);
    assert!(output.quality_flags.contains(&QualityFlag::ZeroPadded));
    assert_abs_diff_eq!(output.rate.bpm, 72.0, epsilon = 1.5);
}

#[test]
fn missing_file_is_a_decode_error() {
    let path = std::env::temp_dir().join(format!("missing-{}.wav", Uuid::new_v4()));
    assert!(PulseProcessor::new().analyze_wav(&path).is_err());
}

#[test]
fn filtering_preserves_real_output() {
    let fs = 250.0;
    let samples: Vec<f64> = (0..512)
        .map(|i| {
            let t = i as f64 / fs;
            (2.0 * PI * 1.1 * t).sin() + 0.4 * (2.0 * PI * 17.0 * t).cos() + 0.2
        })
        .collect();

    let mut spectrum = fft_real(&samples).unwrap();
    filter_band(&mut spectrum, fs, 0.5, 3.5);
    let n = spectrum.len();
    for i in 1..n / 2 {
        assert_eq!(spectrum[i].norm() == 0.0, spectrum[n - i].norm() == 0.0);
    }

    let residue = ifft(&spectrum)
        .unwrap()
        .iter()
        .map(|c| c.im.abs())
        .fold(0.0, f64::max);
    assert!(residue < 1e-9);
}

#[test]
fn independent_recordings_process_in_parallel() {
    let processor = PulseProcessor::new();
    let handles: Vec<_> = [50.0, 72.0, 130.0]
        .into_iter()
        .map(|bpm| {
            let processor = processor.clone();
            thread::spawn(move || {
                let output = processor.analyze(&synth_pulse(bpm, 10.0, 500.0, 0.0)).unwrap();
                (bpm, output.rate.bpm)
            })
        })
        .collect();

    for handle in handles {
        let (expected, measured) = handle.join().unwrap();
        assert_abs_diff_eq!(measured, expected, epsilon = 2.0);
    }
}
