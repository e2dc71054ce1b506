//! Mel filterbank feature extraction from mono audio.
//!
//! Each analysis frame flows through the same four stages:
//!
//! ```text
//! samples -> RingBuffer -> Window -> SpectralTransform -> MelFilterBank -> [n_mels]
//! ```
//!
//! [`Extractor`] frames a whole slice of samples at once, [`StreamingExtractor`]
//! accepts samples as they arrive and emits one mel frame per hop.
//!
//! Default parameters:
//! - SampleRate: 16000
//! - FrameSize: 1024 (also the FFT size)
//! - HopSize: 512 (50% overlap)
//! - NumMels: 40
//! - FMin: 0 Hz
//! - FMax: 8000 Hz
//! - Window: Hann

mod stream;

pub use stream::StreamingExtractor;

use serde::{Deserialize, Serialize};
use signalflow_buffer::{RingBuffer, Sample};
use tracing::debug;

use crate::error::{Error, Result};
use crate::mel::{self, MelFilterBank};
use crate::spectrum::{RealFft, SpectralTransform};
use crate::window::{Window, WindowKind};

/// Configuration for mel filterbank extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input sample rate in Hz.
    pub sample_rate: u32,
    /// Frame length in samples, also used as the FFT size.
    pub frame_size: usize,
    /// Samples between the starts of consecutive frames.
    pub hop_size: usize,
    /// Number of mel bins per frame.
    pub n_mels: usize,
    /// Lower edge of the mel range in Hz.
    pub f_min: f32,
    /// Upper edge of the mel range in Hz.
    pub f_max: f32,
    /// Analysis window shape.
    pub window: WindowKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            frame_size: 1024,
            hop_size: 512,
            n_mels: 40,
            f_min: 0.0,
            f_max: 8000.0,
            window: WindowKind::Hann,
        }
    }
}

impl Config {
    /// Checks that the configuration describes a usable pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.frame_size <= 1 {
            return Err(Error::InvalidWindowSize(self.frame_size));
        }
        if self.hop_size == 0 {
            return Err(Error::InvalidHopSize);
        }
        mel::validate(self.sample_rate, self.n_mels, self.f_min, self.f_max)
    }

    /// Returns the number of frames [`Extractor::extract`] produces for
    /// `num_samples` input samples.
    pub fn num_frames(&self, num_samples: usize) -> usize {
        if self.hop_size == 0 || num_samples < self.frame_size {
            return 0;
        }
        (num_samples - self.frame_size) / self.hop_size + 1
    }
}

/// Mel filterbank feature extractor.
///
/// Window, transform and filterbank are built once; the extractor itself is
/// immutable and can be shared across threads.
pub struct Extractor {
    cfg: Config,
    window: Window,
    transform: Box<dyn SpectralTransform>,
    mel_bank: MelFilterBank,
}

impl Extractor {
    /// Creates a new extractor using the default [`RealFft`] transform.
    pub fn new(cfg: Config) -> Result<Self> {
        cfg.validate()?;
        let transform = RealFft::new(cfg.frame_size)?;
        Self::with_transform(cfg, Box::new(transform))
    }

    /// Creates a new extractor with a caller-supplied spectral transform.
    ///
    /// The transform must be configured for `cfg.frame_size` samples.
    pub fn with_transform(cfg: Config, transform: Box<dyn SpectralTransform>) -> Result<Self> {
        cfg.validate()?;
        if transform.size() != cfg.frame_size {
            return Err(Error::FrameSizeMismatch {
                expected: cfg.frame_size,
                got: transform.size(),
            });
        }
        let window = Window::new(cfg.frame_size, cfg.window)?;
        let mel_bank = MelFilterBank::new(
            cfg.frame_size,
            cfg.sample_rate,
            cfg.n_mels,
            cfg.f_min,
            cfg.f_max,
        );
        debug!(
            frame_size = cfg.frame_size,
            hop_size = cfg.hop_size,
            n_mels = cfg.n_mels,
            "fbank: extractor ready"
        );
        Ok(Self {
            cfg,
            window,
            transform,
            mel_bank,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the analysis window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Returns the mel filterbank.
    pub fn mel_bank(&self) -> &MelFilterBank {
        &self.mel_bank
    }

    /// Runs the newest `frame_size` samples of `buffer` through the pipeline.
    pub fn process_frame<T: Sample>(&self, buffer: &RingBuffer<T>) -> Result<Vec<f32>> {
        let windowed = self.window.apply(buffer)?;
        self.project(&windowed)
    }

    /// Runs a time-ordered frame of exactly `frame_size` samples through the
    /// pipeline.
    pub fn process_slice<T: Sample>(&self, frame: &[T]) -> Result<Vec<f32>> {
        let windowed = self.window.apply_slice(frame)?;
        self.project(&windowed)
    }

    fn project(&self, windowed: &[f32]) -> Result<Vec<f32>> {
        let magnitude = self.transform.magnitude(windowed)?;
        Ok(self.mel_bank.apply(&magnitude))
    }

    /// Extracts mel features from mono samples.
    ///
    /// Returns `[T][n_mels]` where `T = (len(samples) - frame_size) / hop_size + 1`.
    /// Input shorter than one frame yields no frames.
    pub fn extract<T: Sample>(&self, samples: &[T]) -> Result<Vec<Vec<f32>>> {
        let cfg = &self.cfg;
        let num_frames = cfg.num_frames(samples.len());
        let mut features = Vec::with_capacity(num_frames);
        if num_frames == 0 {
            return Ok(features);
        }

        let mut buffer = RingBuffer::<T>::new(cfg.frame_size);
        for t in 0..num_frames {
            let start = t * cfg.hop_size;
            // A full frame overwrites the whole history.
            buffer.write(&samples[start..start + cfg.frame_size]);
            features.push(self.process_frame(&buffer)?);
        }

        Ok(features)
    }

    /// Extracts features from raw int16 PCM bytes (little-endian), normalized
    /// to [-1, 1].
    pub fn extract_from_int16(&self, pcm_bytes: &[u8]) -> Result<Vec<Vec<f32>>> {
        let samples: Vec<f32> = pcm_bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect();
        self.extract(&samples)
    }
}

/// Replaces every energy with its natural log, clamped below at `floor`.
pub fn log_compress(features: &mut [Vec<f32>], floor: f32) {
    for frame in features.iter_mut() {
        for v in frame.iter_mut() {
            *v = v.max(floor).ln();
        }
    }
}

/// Normalizes every mel dimension in place to zero mean and unit variance
/// across frames.
///
/// All frames must have the same length as the first one, otherwise
/// [`Error::FrameSizeMismatch`] is returned and `features` is left untouched.
/// A constant dimension maps to zeros.
pub fn cmvn(features: &mut [Vec<f32>]) -> Result<()> {
    let Some(expected) = features.first().map(Vec::len) else {
        return Ok(());
    };
    if let Some(row) = features.iter().find(|f| f.len() != expected) {
        return Err(Error::FrameSizeMismatch {
            expected,
            got: row.len(),
        });
    }

    let count = features.len() as f64;
    let mut mean = vec![0.0f64; expected];
    for frame in features.iter() {
        for (acc, &v) in mean.iter_mut().zip(frame) {
            *acc += v as f64;
        }
    }
    mean.iter_mut().for_each(|m| *m /= count);

    let mut std = vec![0.0f64; expected];
    for frame in features.iter() {
        for ((acc, &v), m) in std.iter_mut().zip(frame).zip(&mean) {
            let d = v as f64 - m;
            *acc += d * d;
        }
    }
    std.iter_mut().for_each(|s| *s = (*s / count).sqrt().max(1e-10));

    for frame in features.iter_mut() {
        for ((v, m), s) in frame.iter_mut().zip(&mean).zip(&std) {
            *v = ((*v as f64 - m) / s) as f32;
        }
    }
    Ok(())
}

/// Flattens `[T][n_mels]` to `[T * n_mels]`, row-major.
pub fn flatten(features: &[Vec<f32>]) -> Vec<f32> {
    features.iter().flatten().copied().collect()
}
