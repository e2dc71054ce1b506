//! Mel-scale utilities and triangular filterbank construction.

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Converts frequency in Hz to mel scale.
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Converts mel scale frequency back to Hz.
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// One triangular filter over the spectrum bin index space.
///
/// `weights[j]` applies to bin `start_bin + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub start_bin: usize,
    pub weights: Vec<f32>,
}

/// A bank of overlapping triangular filters, built once and applied per frame.
///
/// Filters are ordered by increasing center frequency. Each filter's support
/// runs from its left neighbor's center bin up to (excluding) its right
/// neighbor's center bin, so adjacent filters overlap by one slope.
///
/// # Example
///
/// ```
/// use signalflow_audio::MelFilterBank;
///
/// let bank = MelFilterBank::new(512, 16000, 40, 0.0, 8000.0);
/// let spectrum = vec![1.0f32; 257];
/// let mel = bank.apply(&spectrum);
/// assert_eq!(mel.len(), 40);
/// ```
#[derive(Debug, Clone)]
pub struct MelFilterBank {
    fft_size: usize,
    sample_rate: u32,
    filters: Vec<Filter>,
}

impl MelFilterBank {
    /// Builds the filterbank for spectra of `fft_size / 2 + 1` bins.
    ///
    /// This constructor accepts every parameter combination:
    ///
    /// - `n_mels == 0` gives an empty bank.
    /// - `f_max < f_min` builds the filters over a descending mel range,
    ///   which leaves every filter with an empty support.
    /// - A boundary that maps to a non-finite bin (`sample_rate == 0`, an
    ///   infinite or NaN frequency) gives the filters touching it an empty
    ///   support.
    /// - Supports never extend past bin `fft_size / 2`, the last bin of the
    ///   matching spectrum.
    ///
    /// Use [`try_new`](Self::try_new) to reject degenerate parameters.
    pub fn new(fft_size: usize, sample_rate: u32, n_mels: usize, f_min: f32, f_max: f32) -> Self {
        if n_mels == 0 {
            warn!("mel: building an empty filterbank (n_mels = 0)");
        }
        if f_max < f_min {
            warn!(f_min, f_max, "mel: f_max below f_min, filters are degenerate");
        }
        let num_bins = (fft_size / 2 + 1) as i64;

        let mel_min = hz_to_mel(f_min);
        let mel_max = hz_to_mel(f_max);

        // n_mels + 2 equally spaced mel points
        let step_div = (n_mels + 1) as f32;
        let bins: Vec<Option<i64>> = (0..n_mels + 2)
            .map(|i| {
                let mel = mel_min + i as f32 * (mel_max - mel_min) / step_div;
                let hz = mel_to_hz(mel);
                let bin = ((fft_size + 1) as f32 * hz / sample_rate as f32).floor();
                bin.is_finite().then_some(bin as i64)
            })
            .collect();
        if bins.iter().any(Option::is_none) {
            warn!(
                sample_rate,
                f_min,
                f_max,
                "mel: non-finite bin boundaries, filters are degenerate"
            );
        }

        // Create triangular filters
        let filters = bins
            .windows(3)
            .map(|w| match (w[0], w[1], w[2]) {
                (Some(left), Some(center), Some(right)) => {
                    triangle(left, center, right, num_bins)
                }
                _ => Filter {
                    start_bin: 0,
                    weights: Vec::new(),
                },
            })
            .collect();

        debug!(fft_size, sample_rate, n_mels, f_min, f_max, "mel: built filterbank");

        Self {
            fft_size,
            sample_rate,
            filters,
        }
    }

    /// Builds the filterbank after rejecting degenerate parameters: a zero
    /// FFT size, sample rate or mel count, and any range outside
    /// `0 <= f_min < f_max <= sample_rate / 2`.
    pub fn try_new(
        fft_size: usize,
        sample_rate: u32,
        n_mels: usize,
        f_min: f32,
        f_max: f32,
    ) -> Result<Self> {
        if fft_size == 0 {
            return Err(Error::InvalidFftSize);
        }
        validate(sample_rate, n_mels, f_min, f_max)?;
        Ok(Self::new(fft_size, sample_rate, n_mels, f_min, f_max))
    }

    /// Returns the number of mel bins.
    pub fn n_mels(&self) -> usize {
        self.filters.len()
    }

    /// Returns the FFT size the bank was built for.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Returns the sample rate the bank was built for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the filters in order of increasing center frequency.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Collapses a magnitude spectrum into one energy per mel bin.
    ///
    /// Bins past the end of `spectrum` contribute nothing, so a short
    /// spectrum yields lower energies rather than an error. The output always
    /// has `n_mels()` values.
    pub fn apply(&self, spectrum: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|filter| {
                let bins = spectrum.get(filter.start_bin..).unwrap_or(&[]);
                bins.iter()
                    .zip(&filter.weights)
                    .map(|(&m, &w)| m * w)
                    .sum::<f32>()
            })
            .collect()
    }
}

/// Builds the filter rising over `[left, center)` and falling over
/// `[center, right)`, clipped to bins `[0, num_bins)`.
fn triangle(left: i64, center: i64, right: i64, num_bins: i64) -> Filter {
    let first = left.clamp(0, num_bins);
    let end = right.clamp(first, num_bins);
    // Widened so saturated boundaries cannot overflow the differences.
    let (left, center, right) = (left as i128, center as i128, right as i128);
    let weights = (first..end)
        .map(|k| {
            let k = k as i128;
            if k < center {
                (k - left) as f32 / (center - left) as f32
            } else {
                (right - k) as f32 / (right - center) as f32
            }
        })
        .collect();
    Filter {
        start_bin: first as usize,
        weights,
    }
}

/// Checks the mel parameters shared by every validating constructor.
pub(crate) fn validate(sample_rate: u32, n_mels: usize, f_min: f32, f_max: f32) -> Result<()> {
    if sample_rate == 0 {
        return Err(Error::InvalidSampleRate);
    }
    if n_mels == 0 {
        return Err(Error::InvalidMelCount);
    }
    let nyquist = sample_rate as f32 / 2.0;
    if !(f_min >= 0.0 && f_max > f_min && f_max <= nyquist) {
        return Err(Error::InvalidFrequencyRange { f_min, f_max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hz_mel_roundtrip() {
        for &hz in &[0.0f32, 100.0, 440.0, 1000.0, 4000.0, 8000.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((hz - back).abs() < 0.05, "roundtrip failed for {} Hz", hz);
        }
        assert!((hz_to_mel(1000.0) - 1000.0).abs() < 0.5);
    }

    #[test]
    fn test_boundaries_reference_config() {
        let bank = MelFilterBank::new(512, 16000, 40, 0.0, 8000.0);
        let starts: Vec<usize> = bank.filters().iter().map(|f| f.start_bin).collect();
        assert_eq!(
            starts,
            vec![
                0, 1, 2, 4, 6, 8, 10, 12, 14, 16, 19, 21, 24, 27, 30, 33, 37, 41, 45, 49, 54, 59,
                64, 69, 75, 81, 88, 95, 103, 110, 119, 128, 137, 148, 158, 170, 182, 195, 209, 224,
            ]
        );

        // Last filter ends just before bin 256
        let last = &bank.filters()[39];
        assert_eq!(last.start_bin + last.weights.len(), 256);

        // First filter: [0, 2) rising to bin 1
        assert_eq!(bank.filters()[0].weights, vec![0.0, 1.0]);
    }

    #[test]
    fn test_triangle_shape() {
        let bank = MelFilterBank::new(512, 16000, 40, 0.0, 8000.0);
        for (m, filter) in bank.filters().iter().enumerate() {
            assert!(!filter.weights.is_empty(), "filter {} is empty", m);
            assert_eq!(filter.weights[0], 0.0);
            for &w in &filter.weights {
                assert!((0.0..=1.0).contains(&w));
            }
            let peak = filter.weights.iter().cloned().fold(0.0f32, f32::max);
            assert_eq!(peak, 1.0);
        }
    }

    #[test]
    fn test_supports_overlap_neighbors() {
        let bank = MelFilterBank::new(1024, 16000, 40, 0.0, 8000.0);
        for pair in bank.filters().windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            // b starts at a's center, which lies inside a's support
            assert!(b.start_bin > a.start_bin);
            assert!(b.start_bin < a.start_bin + a.weights.len());
            // a's peak sits exactly where b begins
            assert_eq!(a.weights[b.start_bin - a.start_bin], 1.0);
        }
    }

    #[test]
    fn test_triangle_weights() {
        let f = triangle(2, 4, 8, 257);
        assert_eq!(f.start_bin, 2);
        assert_eq!(f.weights, vec![0.0, 0.5, 1.0, 0.75, 0.5, 0.25]);
    }

    #[test]
    fn test_triangle_clipped_to_spectrum() {
        let f = triangle(2, 4, 8, 6);
        assert_eq!(f.weights, vec![0.0, 0.5, 1.0, 0.75]);

        let f = triangle(-2, 0, 2, 257);
        assert_eq!(f.start_bin, 0);
        assert_eq!(f.weights, vec![1.0, 0.5]);

        let f = triangle(i64::MIN, 0, i64::MAX, 4);
        assert_eq!(f.weights.len(), 4);
        assert!(f.weights.iter().all(|w| w.is_finite()));
    }

    #[test]
    fn test_zero_sample_rate_constructs() {
        let bank = MelFilterBank::new(512, 0, 4, 0.0, 8000.0);
        assert_eq!(bank.n_mels(), 4);
        assert!(bank.filters().iter().all(|f| f.weights.is_empty()));
        assert_eq!(bank.apply(&[1.0; 257]), vec![0.0; 4]);
    }

    #[test]
    fn test_infinite_f_max_constructs() {
        let bank = MelFilterBank::new(512, 16000, 4, 0.0, f32::INFINITY);
        assert_eq!(bank.n_mels(), 4);
        assert!(bank.filters().iter().all(|f| f.weights.len() <= 257));
        assert_eq!(bank.apply(&[1.0; 257]).len(), 4);

        let bank = MelFilterBank::new(512, 16000, 4, f32::NAN, 8000.0);
        assert_eq!(bank.apply(&[1.0; 257]).len(), 4);
    }

    #[test]
    fn test_supports_stop_at_last_bin() {
        // f_max far above Nyquist pushes boundaries past the spectrum
        let bank = MelFilterBank::new(64, 1000, 8, 0.0, 20000.0);
        for f in bank.filters() {
            assert!(f.start_bin + f.weights.len() <= 33);
        }
    }

    #[test]
    fn test_zero_mels() {
        let bank = MelFilterBank::new(64, 16000, 0, 0.0, 8000.0);
        assert_eq!(bank.n_mels(), 0);
        assert!(bank.apply(&[1.0; 33]).is_empty());
        assert!(bank.apply(&[]).is_empty());
    }

    #[test]
    fn test_inverted_range_constructs() {
        let bank = MelFilterBank::new(64, 16000, 10, 1000.0, 500.0);
        assert_eq!(bank.n_mels(), 10);
        let out = bank.apply(&[1.0; 33]);
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_all_energy_in_one_bin() {
        let n = 128;
        let bank = MelFilterBank::new(n, 16000, 10, 0.0, 8000.0);
        let mut mag = vec![0.0f32; n / 2 + 1];
        let mid = mag.len() / 2;
        mag[mid] = 100.0;

        let mel = bank.apply(&mag);
        let max = mel.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max > 0.0);
        for &v in &mel {
            assert!(max >= v);
        }
    }

    #[test]
    fn test_short_spectrum_is_not_an_error() {
        let bank = MelFilterBank::new(512, 16000, 40, 0.0, 8000.0);
        let full = bank.apply(&[1.0; 257]);
        let short = bank.apply(&[1.0; 100]);
        let empty = bank.apply(&[]);

        assert_eq!(short.len(), 40);
        assert_eq!(empty, vec![0.0; 40]);
        for (s, f) in short.iter().zip(&full) {
            assert!(s <= f);
        }
        assert_eq!(short[39], 0.0);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let bank = MelFilterBank::new(256, 22050, 26, 20.0, 11025.0);
        let spectrum: Vec<f32> = (0..129).map(|i| (i as f32 * 0.1).sin().abs()).collect();
        assert_eq!(bank.apply(&spectrum), bank.apply(&spectrum));
    }

    #[test]
    fn test_validate() {
        assert!(validate(16000, 40, 0.0, 8000.0).is_ok());
        assert!(matches!(
            validate(0, 40, 0.0, 8000.0),
            Err(Error::InvalidSampleRate)
        ));
        assert!(matches!(
            validate(16000, 0, 0.0, 8000.0),
            Err(Error::InvalidMelCount)
        ));
        assert!(matches!(
            validate(16000, 10, 1000.0, 500.0),
            Err(Error::InvalidFrequencyRange { .. })
        ));
        assert!(validate(16000, 10, 0.0, 9000.0).is_err());
        assert!(validate(16000, 10, -10.0, 4000.0).is_err());
        assert!(validate(16000, 10, 100.0, f32::NAN).is_err());
    }

    #[test]
    fn test_try_new() {
        let bank = MelFilterBank::try_new(512, 16000, 40, 0.0, 8000.0).unwrap();
        assert_eq!(bank.n_mels(), 40);
        assert_eq!(bank.fft_size(), 512);
        assert_eq!(bank.sample_rate(), 16000);

        assert!(matches!(
            MelFilterBank::try_new(0, 16000, 40, 0.0, 8000.0),
            Err(Error::InvalidFftSize)
        ));
        assert!(matches!(
            MelFilterBank::try_new(512, 0, 4, 0.0, 8000.0),
            Err(Error::InvalidSampleRate)
        ));
        assert!(matches!(
            MelFilterBank::try_new(512, 16000, 4, 4000.0, 2000.0),
            Err(Error::InvalidFrequencyRange { .. })
        ));
        assert!(MelFilterBank::try_new(512, 16000, 4, 0.0, f32::INFINITY).is_err());
    }
}
