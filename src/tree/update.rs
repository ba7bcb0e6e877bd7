//! Incremental repair of both trees after writes to the source

use super::layout::{pair_bounds, Trees};
use crate::sample::Sample;

/// Recompute ancestors from `node` upward until one keeps its value.
///
/// An unchanged node means nothing above it can change either.
fn climb<T: Sample>(tree: &mut [T], mut node: usize, combine: fn(T, T) -> T) {
    while node > 0 {
        let candidate = combine(tree[2 * node], tree[2 * node + 1]);
        if tree[node].same(candidate) {
            break;
        }
        tree[node] = candidate;
        node /= 2;
    }
}

impl<T: Sample> Trees<T> {
    fn climb_both(&mut self, node: usize) {
        climb(self.min.as_mut_slice(), node, T::lesser);
        climb(self.max.as_mut_slice(), node, T::greater);
    }

    /// Repair after `source[index]` changed.
    pub(crate) fn update_point(&mut self, source: &[T], index: usize) {
        let leaf = self.capacity() / 2 + index / 2;
        self.set_leaf(leaf, pair_bounds(source, index / 2));
        self.climb_both(leaf / 2);
    }

    /// Repair after `source[from..to]` changed; `from < to`.
    pub(crate) fn update_span(&mut self, source: &[T], from: usize, to: usize) {
        let half = self.capacity() / 2;
        let first = from / 2;
        let last = (to - 1) / 2;
        for k in first..=last {
            self.set_leaf(half + k, pair_bounds(source, k));
        }

        // A contiguous run of leaves dirties a contiguous run of nodes on
        // every level until the two edges share an ancestor.
        let mut lo = (half + first) / 2;
        let mut hi = (half + last) / 2;
        while lo != hi {
            for node in lo..=hi {
                self.pull(node);
            }
            lo /= 2;
            hi /= 2;
        }
        self.climb_both(lo);
    }
}
