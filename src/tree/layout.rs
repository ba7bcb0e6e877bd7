//! Pair-leaf storage for the min and max trees
//!
//! Both arrays have `n` slots, `n` the smallest power of two covering the
//! source. Node `i` has children `2i` and `2i + 1`, the root is `1` and slot
//! `0` is unused. Leaves live in `[n / 2, n)`; leaf `n / 2 + k` aggregates
//! `source[2k]` and, when present, `source[2k + 1]`.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::sample::Sample;
use crate::MinMaxError;

/// Tree size for a non-empty source of `len` samples.
#[inline]
pub(crate) fn capacity_for(len: usize) -> usize {
    len.next_power_of_two()
}

/// Min and max of leaf pair `k`; the last element of an odd-length source
/// forms a pair on its own.
#[inline]
pub(crate) fn pair_bounds<T: Sample>(source: &[T], k: usize) -> (T, T) {
    let left = source[2 * k];
    match source.get(2 * k + 1) {
        Some(&right) => (left.lesser(right), left.greater(right)),
        None => (left, left),
    }
}

#[cfg(test)]
thread_local! {
    static REFUSE_ALLOCATION: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
}

/// Make the next build on this thread fail as if memory were exhausted.
#[cfg(test)]
pub(crate) fn refuse_next_allocation() {
    REFUSE_ALLOCATION.with(|flag| flag.set(true));
}

fn reserve<T>(n: usize) -> Result<(Vec<T>, Vec<T>), MinMaxError> {
    #[cfg(test)]
    if REFUSE_ALLOCATION.with(|flag| flag.replace(false)) {
        return Err(MinMaxError::ResourceExhausted { nodes: n });
    }
    let mut min = Vec::new();
    let mut max = Vec::new();
    min.try_reserve_exact(n)
        .and_then(|()| max.try_reserve_exact(n))
        .map_err(|_| MinMaxError::ResourceExhausted { nodes: n })?;
    Ok((min, max))
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Trees<T: Sample> {
    pub(crate) min: Vec<T>,
    pub(crate) max: Vec<T>,
}

impl<T: Sample> Trees<T> {
    /// Build both trees over `source` in O(n).
    ///
    /// `cancel` is polled once per tree level.
    pub(crate) fn build(source: &[T], cancel: Option<&AtomicBool>) -> Result<Self, MinMaxError> {
        let n = capacity_for(source.len());
        debug!(len = source.len(), nodes = n, "building min/max trees");

        let (mut min, mut max) = reserve(n)?;
        // Padding. Queries never read a node that reaches past the data.
        min.resize(n, T::max_value());
        max.resize(n, T::min_value());

        let mut trees = Self { min, max };
        let half = n / 2;
        for k in 0..source.len().div_ceil(2) {
            trees.set_leaf(half + k, pair_bounds(source, k));
        }

        for i in (1..half).rev() {
            if i.is_power_of_two() && cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(MinMaxError::BuildAborted("build cancelled".to_string()));
            }
            trees.pull(i);
        }

        debug!(nodes = n, "min/max trees ready");
        Ok(trees)
    }

    /// Number of slots per tree.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.min.len()
    }

    #[inline]
    pub(crate) fn set_leaf(&mut self, node: usize, (low, high): (T, T)) {
        self.min[node] = low;
        self.max[node] = high;
    }

    /// Recompute node `i` of both trees from its children.
    #[inline]
    pub(crate) fn pull(&mut self, i: usize) {
        self.min[i] = self.min[2 * i].lesser(self.min[2 * i + 1]);
        self.max[i] = self.max[2 * i].greater(self.max[2 * i + 1]);
    }

    /// Whether every leaf matches its source pair, padding holds the
    /// sentinels, and every internal node aggregates its children.
    pub(crate) fn is_consistent(&self, source: &[T]) -> bool {
        let n = self.capacity();
        if n != capacity_for(source.len()) || self.max.len() != n {
            return false;
        }
        let half = n / 2;
        let pairs = source.len().div_ceil(2);
        let leaves_ok = (0..half.max(1)).all(|k| {
            let expected = if k < pairs {
                pair_bounds(source, k)
            } else {
                (T::max_value(), T::min_value())
            };
            self.min[half + k].same(expected.0) && self.max[half + k].same(expected.1)
        });
        let nodes_ok = (1..half).all(|i| {
            self.min[i].same(self.min[2 * i].lesser(self.min[2 * i + 1]))
                && self.max[i].same(self.max[2 * i].greater(self.max[2 * i + 1]))
        });
        leaves_ok && nodes_ok
    }
}
