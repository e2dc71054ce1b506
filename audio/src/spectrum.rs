//! Real-input magnitude spectra.
//!
//! [`SpectralTransform`] is the seam between the feature pipeline and whatever
//! FFT implementation computes the spectrum. [`RealFft`] is the default
//! provider, backed by the `realfft` crate.

use std::fmt;
use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use tracing::debug;

use crate::error::{Error, Result};

/// Maps a real frame of `size()` samples to `size() / 2 + 1` magnitudes.
///
/// Implementations must be deterministic, map an all-zero frame to all-zero
/// magnitudes and a unit impulse at position 0 to magnitude 1 in every bin.
pub trait SpectralTransform: Send + Sync {
    /// Returns the frame length this transform was configured for.
    fn size(&self) -> usize;

    /// Returns the number of non-redundant bins, `size() / 2 + 1`.
    fn num_bins(&self) -> usize {
        self.size() / 2 + 1
    }

    /// Computes `sqrt(re² + im²)` for every non-redundant DFT bin of `frame`.
    fn magnitude(&self, frame: &[f32]) -> Result<Vec<f32>>;
}

/// Forward real FFT planned once for a fixed size.
#[derive(Clone)]
pub struct RealFft {
    fft: Arc<dyn RealToComplex<f32>>,
}

impl RealFft {
    /// Plans a forward transform for frames of `size` samples.
    ///
    /// Any non-zero size works; powers of two are fastest.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidFftSize);
        }
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(size);
        debug!(size, "spectrum: planned real fft");
        Ok(Self { fft })
    }
}

impl fmt::Debug for RealFft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealFft").field("size", &self.size()).finish()
    }
}

impl SpectralTransform for RealFft {
    fn size(&self) -> usize {
        self.fft.len()
    }

    fn magnitude(&self, frame: &[f32]) -> Result<Vec<f32>> {
        if frame.len() != self.size() {
            return Err(Error::FrameSizeMismatch {
                expected: self.size(),
                got: frame.len(),
            });
        }

        // realfft uses the input as scratch space.
        let mut input = frame.to_vec();
        let mut spectrum: Vec<Complex<f32>> = self.fft.make_output_vec();
        self.fft
            .process(&mut input, &mut spectrum)
            .map_err(|e| Error::Transform(e.to_string()))?;

        Ok(spectrum
            .iter()
            .map(|c| (c.re * c.re + c.im * c.im).sqrt())
            .collect())
    }
}
