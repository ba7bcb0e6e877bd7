//! Shared helpers for integration tests

#![allow(dead_code)]

use proptest::prelude::*;

/// Brute-force min/max of `data[l..=r]`.
pub fn brute_force(data: &[i32], l: usize, r: usize) -> (f64, f64) {
    let window = &data[l..=r];
    let low = *window.iter().min().expect("non-empty window");
    let high = *window.iter().max().expect("non-empty window");
    (low as f64, high as f64)
}

/// Non-empty signals with plenty of repeated values.
pub fn signal(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(-50i32..50, 1..max_len)
}

/// A signal together with a valid inclusive range over it.
pub fn signal_and_range(max_len: usize) -> impl Strategy<Value = (Vec<i32>, usize, usize)> {
    signal(max_len).prop_flat_map(|data| {
        let len = data.len();
        (Just(data), 0..len, 0..len).prop_map(|(data, a, b)| (data, a.min(b), a.max(b)))
    })
}

/// Sawtooth of `len` samples.
pub fn sawtooth(len: usize, period: i32) -> Vec<i32> {
    (0..len as i32).map(|i| i % period - period / 2).collect()
}

/// Float samples dominated by the awkward values: NaN gaps, signed zeros and
/// the infinities, mixed with ordinary readings.
pub fn float_sample() -> impl Strategy<Value = f64> {
    prop_oneof![
        2 => Just(f64::NAN),
        1 => Just(0.0),
        1 => Just(-0.0),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
        4 => -1e3f64..1e3,
    ]
}

/// Non-empty float signals drawn from [`float_sample`].
pub fn gappy_signal(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(float_sample(), 1..max_len)
}

/// Brute-force min/max of `data[l..=r]` ignoring NaN, ordered by
/// `total_cmp`; NaN only when the whole window is NaN.
pub fn brute_force_f64(data: &[f64], l: usize, r: usize) -> (f64, f64) {
    let mut numbers = data[l..=r].iter().copied().filter(|v| !v.is_nan());
    let Some(first) = numbers.next() else {
        return (f64::NAN, f64::NAN);
    };
    numbers.fold((first, first), |(low, high), v| {
        (
            if v.total_cmp(&low).is_lt() { v } else { low },
            if v.total_cmp(&high).is_gt() { v } else { high },
        )
    })
}

/// Bit patterns of a reported pair, so NaN compares equal to itself and
/// `-0.0` differs from `0.0`.
pub fn bits((low, high): (f64, f64)) -> (u64, u64) {
    (low.to_bits(), high.to_bits())
}
