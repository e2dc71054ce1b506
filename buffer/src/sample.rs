//! Numeric element bound for sample buffers.

/// A real-valued numeric sample.
///
/// Implemented for the primitive integer and floating point types. The
/// default value of every implementor is zero, which is what unwritten
/// buffer slots hold.
pub trait Sample: Copy + Default + PartialEq + Send + Sync + 'static {
    /// Converts the sample to single precision.
    fn to_f32(self) -> f32;
}

macro_rules! impl_sample {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f32(self) -> f32 {
                    self as f32
                }
            }
        )*
    };
}

impl_sample!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
