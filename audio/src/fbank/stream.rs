use signalflow_buffer::{RingBuffer, Sample};
use tracing::trace;

use super::{Config, Extractor};
use crate::error::Result;

/// Sliding-window extractor for live sample streams.
///
/// Samples are pushed one at a time into a ring buffer holding the last
/// `frame_size` samples. The first mel frame is emitted on the
/// `frame_size`-th sample, then one every `hop_size` samples, which yields
/// exactly the frames [`Extractor::extract`] computes over the same input.
///
/// # Example
///
/// ```
/// use signalflow_audio::{Config, StreamingExtractor};
///
/// let cfg = Config { frame_size: 256, hop_size: 128, ..Config::default() };
/// let mut stream = StreamingExtractor::new(cfg).unwrap();
///
/// let mut frames = 0;
/// for i in 0..512 {
///     if stream.push((i as f32 * 0.1).sin()).unwrap().is_some() {
///         frames += 1;
///     }
/// }
/// assert_eq!(frames, 3);
/// ```
pub struct StreamingExtractor {
    extractor: Extractor,
    buffer: RingBuffer<f32>,
    // Samples left until the next frame is due.
    countdown: usize,
    emitted: u64,
}

impl StreamingExtractor {
    /// Creates a streaming extractor with the default spectral transform.
    pub fn new(cfg: Config) -> Result<Self> {
        Ok(Self::from_extractor(Extractor::new(cfg)?))
    }

    /// Wraps an already configured extractor.
    pub fn from_extractor(extractor: Extractor) -> Self {
        let frame_size = extractor.config().frame_size;
        Self {
            extractor,
            buffer: RingBuffer::new(frame_size),
            countdown: frame_size,
            emitted: 0,
        }
    }

    /// Returns the wrapped extractor.
    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Returns the number of frames emitted since creation or reset.
    pub fn frames_emitted(&self) -> u64 {
        self.emitted
    }

    /// Pushes one sample, returning a mel frame when one is due.
    pub fn push<T: Sample>(&mut self, sample: T) -> Result<Option<Vec<f32>>> {
        self.buffer.push(sample.to_f32());
        self.countdown -= 1;
        if self.countdown > 0 {
            return Ok(None);
        }

        self.countdown = self.extractor.config().hop_size;
        let frame = self.extractor.process_frame(&self.buffer)?;
        self.emitted += 1;
        trace!(frame = self.emitted, "fbank: stream frame");
        Ok(Some(frame))
    }

    /// Pushes every sample of `samples`, collecting the frames that fall due.
    pub fn push_slice<T: Sample>(&mut self, samples: &[T]) -> Result<Vec<Vec<f32>>> {
        let mut frames = Vec::new();
        for &s in samples {
            if let Some(frame) = self.push(s)? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    /// Drops all buffered history; the next frame again needs a full
    /// `frame_size` samples.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.countdown = self.extractor.config().frame_size;
        self.emitted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config {
            frame_size: 256,
            hop_size: 100,
            n_mels: 20,
            ..Config::default()
        }
    }

    fn chirp(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32 / 16000.0;
                (2.0 * std::f32::consts::PI * (200.0 + 2000.0 * t) * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_first_frame_on_full_buffer() {
        let mut stream = StreamingExtractor::new(cfg()).unwrap();
        let samples = chirp(256);
        for &s in &samples[..255] {
            assert!(stream.push(s).unwrap().is_none());
        }
        let frame = stream.push(samples[255]).unwrap().unwrap();
        assert_eq!(frame.len(), 20);
        assert_eq!(stream.frames_emitted(), 1);
    }

    #[test]
    fn test_matches_batch_extract() {
        let samples = chirp(3000);
        let batch = Extractor::new(cfg()).unwrap().extract(&samples).unwrap();

        let mut stream = StreamingExtractor::new(cfg()).unwrap();
        let streamed = stream.push_slice(&samples).unwrap();

        assert_eq!(streamed.len(), batch.len());
        for (a, b) in streamed.iter().zip(&batch) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_chunked_pushes_match_single_push() {
        let samples = chirp(1500);

        let mut whole = StreamingExtractor::new(cfg()).unwrap();
        let expected = whole.push_slice(&samples).unwrap();

        let mut chunked = StreamingExtractor::new(cfg()).unwrap();
        let mut got = Vec::new();
        for chunk in samples.chunks(37) {
            got.extend(chunked.push_slice(chunk).unwrap());
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn test_reset() {
        let samples = chirp(600);
        let mut stream = StreamingExtractor::new(cfg()).unwrap();
        let first = stream.push_slice(&samples).unwrap();

        stream.reset();
        assert_eq!(stream.frames_emitted(), 0);
        assert!(stream.push_slice(&samples[..255]).unwrap().is_empty());

        stream.reset();
        assert_eq!(stream.push_slice(&samples).unwrap(), first);
    }
}
