//! Error types for Synheart Pulse

use thiserror::Error;

/// Errors that can occur during computation
///
/// Insufficient data (empty recordings, too few beats) is not an error; those
/// cases resolve to zero/empty results so the classifier can report them.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Transform length {0} is not a power of two; zero-pad the input first")]
    InvalidLength(usize),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Only mono audio is supported, found {0} channels")]
    UnsupportedChannels(u16),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
