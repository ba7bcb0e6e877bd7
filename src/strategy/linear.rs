//! Reference strategy: scan the requested span on every query

use tracing::trace;

use super::{check_source, MinMaxSearch};
use crate::sample::{fold, report, Sample};
use crate::MinMaxError;

/// Inclusive min/max scan over `source[l..=r]`.
///
/// Also serves as the segment tree's fallback while its trees are not ready.
pub(crate) fn scan_min_max<T: Sample>(source: &[T], l: usize, r: usize) -> (T, T) {
    assert!(
        l <= r && r < source.len(),
        "query range [{l}, {r}] out of bounds for source of length {}",
        source.len()
    );
    let first = source[l];
    source[l + 1..=r].iter().copied().fold((first, first), fold)
}

/// O(r - l + 1) per query, O(1) per element update, no auxiliary state.
///
/// The right choice for short signals, or for signals rewritten far more often
/// than they are queried.
#[derive(Debug, Clone)]
pub struct LinearSearch<T: Sample> {
    source: Vec<T>,
}

impl<T: Sample> LinearSearch<T> {
    /// Wrap a non-empty source.
    pub fn new(data: Vec<T>) -> Result<Self, MinMaxError> {
        check_source(&data)?;
        Ok(Self { source: data })
    }

    /// Hand the source back to the caller.
    pub fn into_source(self) -> Vec<T> {
        self.source
    }
}

impl<T: Sample> MinMaxSearch<T> for LinearSearch<T> {
    fn set_source(&mut self, data: Vec<T>) -> Result<(), MinMaxError> {
        check_source(&data)?;
        self.source = data;
        Ok(())
    }

    fn source(&self) -> &[T] {
        &self.source
    }

    fn query_range(&self, l: usize, r: usize) -> (f64, f64) {
        report(scan_min_max(&self.source, l, r))
    }

    fn update_element(&mut self, index: usize, value: T) {
        self.source[index] = value;
    }

    fn update_range(&mut self, from: usize, to: usize, new_data: &[T], from_data: usize) {
        if from >= to {
            return;
        }
        trace!(from, to, "linear range update");
        self.source[from..to].copy_from_slice(&new_data[from_data..from_data + (to - from)]);
    }
}
