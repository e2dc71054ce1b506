use signalflow_buffer::BufferError;
use thiserror::Error;

/// Errors returned by feature extraction operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("window size must be at least 2, got {0}")]
    InvalidWindowSize(usize),

    #[error("fft size must be greater than 0")]
    InvalidFftSize,

    #[error("sample rate must be greater than 0")]
    InvalidSampleRate,

    #[error("number of mel bins must be greater than 0")]
    InvalidMelCount,

    #[error("invalid frequency range: f_min {f_min} Hz, f_max {f_max} Hz")]
    InvalidFrequencyRange { f_min: f32, f_max: f32 },

    #[error("hop size must be greater than 0")]
    InvalidHopSize,

    #[error("frame size mismatch: expected {expected}, got {got}")]
    FrameSizeMismatch { expected: usize, got: usize },

    #[error("spectral transform: {0}")]
    Transform(String),
}

/// Result alias for feature extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
