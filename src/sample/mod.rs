//! Numeric capability interface for signal samples
//!
//! The trees only ever compare values of the element type itself; the
//! conversion to `f64` happens once, when a query result is reported.

use std::fmt::Debug;

use num_traits::Bounded;

/// Element type that can back a min/max search.
///
/// `lesser` / `greater` must be associative and commutative over every value
/// of the type, so that the trees and a linear scan agree on any grouping.
/// `min_value()` / `max_value()` (from [`Bounded`]) pad the trees.
///
/// Floats skip NaN: a range reports NaN only when every sample in it is NaN.
/// Other floats are ordered by [`f64::total_cmp`], so `-0.0 < 0.0` and the
/// infinities are ordinary extremes.
pub trait Sample: Copy + PartialOrd + Bounded + Debug + Send + Sync + 'static {
    /// Lossy (for wide integers) conversion used for reporting only.
    fn to_f64(self) -> f64;

    /// Smaller of two values, preferring `self` on ties.
    #[inline]
    fn lesser(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Larger of two values, preferring `self` on ties.
    #[inline]
    fn greater(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// Whether two stored aggregates are indistinguishable.
    #[inline]
    fn same(self, other: Self) -> bool {
        self == other
    }
}

macro_rules! impl_sample_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sample for $ty {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

macro_rules! impl_sample_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sample for $ty {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn lesser(self, other: Self) -> Self {
                    if self.is_nan() || (!other.is_nan() && other.total_cmp(&self).is_lt()) {
                        other
                    } else {
                        self
                    }
                }

                #[inline]
                fn greater(self, other: Self) -> Self {
                    if self.is_nan() || (!other.is_nan() && other.total_cmp(&self).is_gt()) {
                        other
                    } else {
                        self
                    }
                }

                // Bitwise, so NaN matches itself and -0.0 differs from 0.0.
                #[inline]
                fn same(self, other: Self) -> bool {
                    self.to_bits() == other.to_bits()
                }
            }
        )*
    };
}

impl_sample_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_sample_float!(f32, f64);

/// Fold one value into a running `(low, high)` pair.
#[inline]
pub(crate) fn fold<T: Sample>((low, high): (T, T), value: T) -> (T, T) {
    (low.lesser(value), high.greater(value))
}

/// Fold two already-aggregated bounds into a running `(low, high)` pair.
#[inline]
pub(crate) fn fold_bounds<T: Sample>((low, high): (T, T), min: T, max: T) -> (T, T) {
    (low.lesser(min), high.greater(max))
}

/// Report an aggregate pair to the caller.
#[inline]
pub(crate) fn report<T: Sample>((low, high): (T, T)) -> (f64, f64) {
    (low.to_f64(), high.to_f64())
}
