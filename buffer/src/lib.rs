//! Fixed-capacity sample history buffers.
//!
//! This crate provides [`RingBuffer<T>`], a fixed-size buffer that overwrites
//! its oldest sample when full. It serves as the sliding analysis window over
//! a live sample stream: push samples as they arrive, then read the history
//! back relative to the newest sample.
//!
//! ```
//! use signalflow_buffer::RingBuffer;
//!
//! let mut buf = RingBuffer::<i32>::new(3);
//! buf.write(&[1, 2, 3, 4, 5]); // Overwrites 1, 2
//! assert_eq!(buf.to_vec(), vec![3, 4, 5]);
//! assert_eq!(buf.at(0).unwrap(), 5);
//! ```
//!
//! # Element Types
//!
//! Elements are restricted to the primitive numeric types through the
//! [`Sample`] trait.
//!
//! # Ownership
//!
//! A buffer is owned by exactly one holder and pushing requires `&mut self`.
//! `Clone` produces an independent deep copy.

mod error;
mod ring_buffer;
mod sample;

pub use error::BufferError;
pub use ring_buffer::RingBuffer;
pub use sample::Sample;
