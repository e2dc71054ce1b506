//! Precomputed raised-cosine analysis windows.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use signalflow_buffer::{RingBuffer, Sample};
use tracing::debug;

use crate::error::{Error, Result};

/// Shape of the raised-cosine window curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// `0.5 - 0.5 * cos(angle)`, zero at both ends.
    #[default]
    Hann,
    /// `0.54 - 0.46 * cos(angle)`, about 0.08 at both ends.
    Hamming,
}

impl WindowKind {
    fn coefficient(self, angle: f64) -> f64 {
        match self {
            WindowKind::Hann => 0.5 - 0.5 * angle.cos(),
            WindowKind::Hamming => 0.54 - 0.46 * angle.cos(),
        }
    }
}

/// An analysis window with coefficients computed once at construction.
///
/// The window is immutable after construction and can be applied to any
/// number of frames of the same size, from any number of threads.
///
/// # Example
///
/// ```
/// use signalflow_audio::{Window, WindowKind};
/// use signalflow_buffer::RingBuffer;
///
/// let window = Window::new(4, WindowKind::Hann).unwrap();
/// let mut buf = RingBuffer::<f32>::new(4);
/// buf.write(&[1.0, 1.0, 1.0, 1.0]);
///
/// let frame = window.apply(&buf).unwrap();
/// assert_eq!(frame.len(), 4);
/// assert_eq!(frame[0], 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Window {
    kind: WindowKind,
    coefficients: Vec<f32>,
}

impl Window {
    /// Creates a window of `size` points.
    ///
    /// Sizes below 2 are rejected: the curve is defined over
    /// `2π·i/(size-1)`, which has no meaning for a single point.
    pub fn new(size: usize, kind: WindowKind) -> Result<Self> {
        if size <= 1 {
            return Err(Error::InvalidWindowSize(size));
        }
        let denom = (size - 1) as f64;
        let coefficients = (0..size)
            .map(|i| kind.coefficient(2.0 * PI * i as f64 / denom) as f32)
            .collect();
        debug!(size, ?kind, "window: created");
        Ok(Self { kind, coefficients })
    }

    /// Returns the number of points.
    pub fn size(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns the window shape.
    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    /// Returns the precomputed coefficients.
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    /// Windows the most recent `size` samples of `buffer`.
    ///
    /// The output is in time order, oldest sample first:
    /// `output[i] = buffer.at(size - 1 - i) * coefficient[i]`. A buffer with
    /// a larger capacity only contributes its newest `size` samples; a buffer
    /// with a smaller capacity fails with an out-of-range error.
    pub fn apply<T: Sample>(&self, buffer: &RingBuffer<T>) -> Result<Vec<f32>> {
        let size = self.size();
        let mut output = Vec::with_capacity(size);
        for (i, &w) in self.coefficients.iter().enumerate() {
            output.push(buffer.at(size - 1 - i)?.to_f32() * w);
        }
        Ok(output)
    }

    /// Windows a time-ordered frame of exactly `size` samples.
    pub fn apply_slice<T: Sample>(&self, frame: &[T]) -> Result<Vec<f32>> {
        if frame.len() != self.size() {
            return Err(Error::FrameSizeMismatch {
                expected: self.size(),
                got: frame.len(),
            });
        }
        Ok(frame
            .iter()
            .zip(&self.coefficients)
            .map(|(&s, &w)| s.to_f32() * w)
            .collect())
    }
}
