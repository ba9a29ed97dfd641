//! Scalar trait bridging concrete float types into generic kernels

use num_traits::Float;
use std::fmt::{Debug, Display};

/// Trait for types that can be entries of a sketching operator
///
/// Implemented for `f32` and `f64`. Kernels draw random words as `u32` and
/// convert through `f64` so that the generated sequence is identical for both
/// precisions up to the final rounding.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - basic kernel requirements
/// - `Float` - arithmetic, comparison, and special values
pub trait Scalar: Copy + Send + Sync + 'static + Float + Debug + Display {
    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Machine epsilon for this type
    fn eps() -> Self;
}

impl Scalar for f64 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn eps() -> Self {
        f64::EPSILON
    }
}

impl Scalar for f32 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn eps() -> Self {
        f32::EPSILON
    }
}
