//! WAV decoding
//!
//! Reads mono 16-bit PCM recordings into a normalized [`Signal`] and writes
//! signals back out. The numeric pipeline never touches audio containers; this
//! module is the boundary that hands it samples.

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::error::ComputeError;
use crate::types::Signal;

/// Divisor mapping 16-bit PCM onto [-1.0, 1.0)
pub const PCM16_SCALE: f64 = 32768.0;

/// Decode a mono 16-bit WAV file
pub fn decode_wav(path: &Path) -> Result<Signal, ComputeError> {
    let reader = WavReader::open(path)?;
    decode_reader(reader)
}

/// Decode a mono 16-bit WAV from any byte stream (stdin, sockets, buffers)
pub fn decode_wav_reader<R: Read>(reader: R) -> Result<Signal, ComputeError> {
    let reader = WavReader::new(reader)?;
    decode_reader(reader)
}

/// Decode a mono 16-bit WAV held in memory
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<Signal, ComputeError> {
    decode_wav_reader(Cursor::new(bytes))
}

fn decode_reader<R: Read>(mut reader: WavReader<R>) -> Result<Signal, ComputeError> {
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(ComputeError::UnsupportedChannels(spec.channels));
    }
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(ComputeError::UnsupportedFormat(format!(
            "{}-bit {:?}, expected 16-bit integer PCM",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    if spec.sample_rate == 0 {
        return Err(ComputeError::InvalidSampleRate(0.0));
    }

    let samples = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f64 / PCM16_SCALE))
        .collect::<Result<Vec<f64>, _>>()?;

    debug!(
        samples = samples.len(),
        sample_rate = spec.sample_rate,
        "decoded wav"
    );
    Ok(Signal::new(samples, spec.sample_rate as f64))
}

/// Write a signal as a mono 16-bit WAV file
pub fn write_wav(path: &Path, signal: &Signal) -> Result<(), ComputeError> {
    let spec = wav_spec(signal)?;
    let writer = WavWriter::create(path, spec)?;
    write_samples(writer, signal)
}

/// Encode a signal as mono 16-bit WAV bytes
pub fn encode_wav_bytes(signal: &Signal) -> Result<Vec<u8>, ComputeError> {
    let spec = wav_spec(signal)?;
    let mut buf: Vec<u8> = Vec::new();
    let writer = WavWriter::new(Cursor::new(&mut buf), spec)?;
    write_samples(writer, signal)?;
    Ok(buf)
}

fn wav_spec(signal: &Signal) -> Result<WavSpec, ComputeError> {
    let rate = signal.sample_rate_hz.round();
    if !(rate >= 1.0 && rate <= u32::MAX as f64) {
        return Err(ComputeError::InvalidSampleRate(signal.sample_rate_hz));
    }
    Ok(WavSpec {
        channels: 1,
        sample_rate: rate as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    })
}

fn write_samples<W: Write + Seek>(
    mut writer: WavWriter<W>,
    signal: &Signal,
) -> Result<(), ComputeError> {
    for s in &signal.samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16;
        writer.write_sample(v)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    fn raw_wav(channels: u16, bits: u16, format: SampleFormat, frames: &[i32]) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: bits,
            sample_format: format,
        };
        let mut buf = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
            for &f in frames {
                for _ in 0..channels {
                    match (format, bits) {
                        (SampleFormat::Int, 16) => writer.write_sample(f as i16).unwrap(),
                        (SampleFormat::Int, _) => writer.write_sample(f).unwrap(),
                        (SampleFormat::Float, _) => writer.write_sample(f as f32).unwrap(),
                    }
                }
            }
            writer.finalize().unwrap();
        }
        buf
    }

    #[test]
    fn test_normalizes_pcm16() {
        let bytes = raw_wav(1, 16, SampleFormat::Int, &[0, 16384, -32768, 32767]);
        let signal = decode_wav_bytes(&bytes).unwrap();

        assert_eq!(signal.sample_rate_hz, 8000.0);
        assert_eq!(signal.samples, vec![0.0, 0.5, -1.0, 32767.0 / 32768.0]);
    }

    #[test]
    fn test_decodes_from_plain_reader() {
        let bytes = raw_wav(1, 16, SampleFormat::Int, &[-16384, 8192]);
        let signal = decode_wav_reader(&bytes[..]).unwrap();

        assert_eq!(signal.sample_rate_hz, 8000.0);
        assert_eq!(signal.samples, vec![-0.5, 0.25]);

        let stereo = raw_wav(2, 16, SampleFormat::Int, &[1]);
        assert!(matches!(
            decode_wav_reader(stereo.as_slice()),
            Err(ComputeError::UnsupportedChannels(2))
        ));
    }

    #[test]
    fn test_rejects_stereo() {
        let bytes = raw_wav(2, 16, SampleFormat::Int, &[1, 2, 3]);
        assert!(matches!(
            decode_wav_bytes(&bytes),
            Err(ComputeError::UnsupportedChannels(2))
        ));
    }

    #[test]
    fn test_rejects_non_pcm16() {
        let bytes = raw_wav(1, 24, SampleFormat::Int, &[1, 2, 3]);
        assert!(matches!(
            decode_wav_bytes(&bytes),
            Err(ComputeError::UnsupportedFormat(_))
        ));

        let bytes = raw_wav(1, 32, SampleFormat::Float, &[0, 1]);
        assert!(matches!(
            decode_wav_bytes(&bytes),
            Err(ComputeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            decode_wav_bytes(b"definitely not a wav file"),
            Err(ComputeError::Wav(_))
        ));
    }

    #[test]
    fn test_encode_then_decode_preserves_shape() {
        let signal = Signal::new(vec![0.0, 0.25, -0.5, 0.99, -1.0], 1000.0);
        let decoded = decode_wav_bytes(&encode_wav_bytes(&signal).unwrap()).unwrap();

        assert_eq!(decoded.len(), signal.len());
        assert_eq!(decoded.sample_rate_hz, 1000.0);
        for (a, b) in signal.samples.iter().zip(decoded.samples.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_encode_rejects_bad_rate() {
        let signal = Signal::new(vec![0.0], 0.0);
        assert!(matches!(
            encode_wav_bytes(&signal),
            Err(ComputeError::InvalidSampleRate(_))
        ));
    }
}
