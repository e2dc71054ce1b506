//! Overwriting ring buffer implementation.

use crate::error::BufferError;
use crate::sample::Sample;

/// A fixed-capacity overwriting history buffer.
///
/// `RingBuffer<T>` keeps the `capacity` most recent samples pushed into it.
/// When the buffer is full, each push overwrites the oldest sample. Reads are
/// indexed relative to the most recent push: index 0 is the newest sample and
/// index `capacity - 1` the oldest one still retained.
///
/// # Semantics
///
/// - **Push**: Never fails, overwrites the oldest sample when full
/// - **at**: Bounds-checked against the capacity, wraps modulo capacity
/// - **get**: Only returns samples that were actually pushed
///
/// Slots that have not been written yet hold `T::default()` (zero), so `at`
/// on a partially filled buffer reads zeros for the missing history. Use
/// [`len`](Self::len) or [`get`](Self::get) when that distinction matters.
///
/// # Example
///
/// ```
/// use signalflow_buffer::RingBuffer;
///
/// // Keep only the 4 most recent samples
/// let mut buf = RingBuffer::<f32>::new(4);
/// for i in 0..6 {
///     buf.push(i as f32);
/// }
///
/// assert_eq!(buf.at(0).unwrap(), 5.0); // newest
/// assert_eq!(buf.at(3).unwrap(), 2.0); // oldest retained
/// assert!(buf.at(4).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: Vec<T>,
    // Next slot to write.
    head: usize,
    // Valid samples, saturating at capacity.
    len: usize,
}

impl<T: Sample> RingBuffer<T> {
    /// Creates a new zero-filled RingBuffer with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use [`try_new`](Self::try_new) to get an
    /// error instead.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        Self::alloc(capacity)
    }

    /// Creates a new zero-filled RingBuffer, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        Ok(Self::alloc(capacity))
    }

    fn alloc(capacity: usize) -> Self {
        RingBuffer {
            buf: vec![T::default(); capacity],
            head: 0,
            len: 0,
        }
    }

    /// Pushes a sample, overwriting the oldest one if the buffer is full.
    pub fn push(&mut self, value: T) {
        let capacity = self.buf.len();
        self.buf[self.head] = value;
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
    }

    /// Pushes every sample of `data` in order.
    pub fn write(&mut self, data: &[T]) {
        for &value in data {
            self.push(value);
        }
    }

    /// Returns the sample `index` steps back from the most recent push.
    ///
    /// Index 0 is the newest sample. Fails when `index >= capacity`. Slots
    /// never written read as zero.
    pub fn at(&self, index: usize) -> Result<T, BufferError> {
        let capacity = self.buf.len();
        if index >= capacity {
            return Err(BufferError::OutOfRange { index, capacity });
        }
        // Step back from the newest slot; adding capacity keeps it non-negative.
        let pos = (self.head + capacity - 1 - index) % capacity;
        Ok(self.buf[pos])
    }

    /// Returns the sample `index` steps back from the most recent push, or
    /// `None` if no sample has been pushed into that position yet.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        self.at(index).ok()
    }

    /// Returns the number of samples pushed so far, up to the capacity.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been pushed since creation or reset.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true once `capacity` samples have been pushed, meaning the
    /// whole history is valid.
    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// Returns the buffer capacity.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Clears all samples back to zero.
    pub fn reset(&mut self) {
        self.buf.fill(T::default());
        self.head = 0;
        self.len = 0;
    }

    /// Returns a copy of the valid samples, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        let capacity = self.buf.len();
        let start = (self.head + capacity - self.len) % capacity;
        (0..self.len)
            .map(|i| self.buf[(start + i) % capacity])
            .collect()
    }
}
