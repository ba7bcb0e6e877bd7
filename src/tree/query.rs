use super::layout::Trees;
use crate::sample::{fold, fold_bounds, Sample};

impl<T: Sample> Trees<T> {
    /// Min and max of `source[l..=r]` in O(log n).
    pub(crate) fn query(&self, source: &[T], l: usize, r: usize) -> (T, T) {
        assert!(
            l <= r && r < source.len(),
            "query range [{l}, {r}] out of bounds for source of length {}",
            source.len()
        );
        if l == r {
            return (source[l], source[l]);
        }

        let n = self.capacity();
        // Seeded from a sample in range; the padding sentinels are not
        // identities for floats at the infinities.
        let mut acc = (source[l], source[l]);

        // Leaves hold pairs, so boundary samples whose partner lies outside
        // the range are read from the source.
        if l & 1 == 1 {
            acc = fold(acc, source[l]);
        }
        if r & 1 == 0 {
            acc = fold(acc, source[r]);
        }

        // Leaves covering the interior pairs
        let mut l = (l + n + 1) / 2;
        let mut r = (r + n - 1) / 2;
        while l <= r {
            if l & 1 == 1 {
                acc = fold_bounds(acc, self.min[l], self.max[l]);
            }
            if r & 1 == 0 {
                acc = fold_bounds(acc, self.min[r], self.max[r]);
            }
            l = (l + 1) / 2;
            r = (r - 1) / 2;
        }
        acc
    }
}
