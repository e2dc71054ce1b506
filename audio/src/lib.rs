//! Mel spectral features for mono audio.
//!
//! This crate turns a stream of samples into Mel filterbank energies:
//!
//! - `window`: precomputed Hann and Hamming analysis windows
//! - `spectrum`: the [`SpectralTransform`] seam and its `realfft` provider
//! - `mel`: triangular Mel filterbank construction and projection
//! - `fbank`: frame extraction over slices and live streams, plus
//!   log/CMVN post-processing
//!
//! # Example
//!
//! ```rust
//! use signalflow_audio::{MelFilterBank, RealFft, SpectralTransform, Window, WindowKind};
//! use signalflow_buffer::RingBuffer;
//!
//! let n = 512;
//! let sample_rate = 16000;
//!
//! // Slide samples into the analysis buffer
//! let mut buffer = RingBuffer::<f32>::new(n);
//! for i in 0..n {
//!     let t = i as f32 / sample_rate as f32;
//!     buffer.push((2.0 * std::f32::consts::PI * 1000.0 * t).sin());
//! }
//!
//! let window = Window::new(n, WindowKind::Hann).unwrap();
//! let fft = RealFft::new(n).unwrap();
//! let mel_bank = MelFilterBank::new(n, sample_rate, 40, 0.0, 8000.0);
//!
//! let windowed = window.apply(&buffer).unwrap();
//! let magnitude = fft.magnitude(&windowed).unwrap();
//! let mel = mel_bank.apply(&magnitude);
//! assert_eq!(mel.len(), 40);
//! ```

mod error;
pub mod fbank;
pub mod mel;
pub mod spectrum;
pub mod window;

pub use error::{Error, Result};
pub use fbank::{cmvn, flatten, log_compress, Config, Extractor, StreamingExtractor};
pub use mel::{hz_to_mel, mel_to_hz, Filter, MelFilterBank};
pub use spectrum::{RealFft, SpectralTransform};
pub use window::{Window, WindowKind};
