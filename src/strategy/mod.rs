//! Range min/max query contract and its implementations
//!
//! Callers pick an implementation by expected signal size and mutation rate;
//! every implementation answers identically, so they can be swapped freely.

mod linear;

pub use linear::LinearSearch;
pub(crate) use linear::scan_min_max;

use crate::sample::Sample;
use crate::tree::SegmentTree;
use crate::{MinMaxError, TreeConfig};

/// Capability contract shared by all min/max search strategies.
///
/// Indices are trusted: a query or update outside `0..len()` panics.
pub trait MinMaxSearch<T: Sample> {
    /// Replace the backing array and rebuild any aggregate state.
    ///
    /// An empty array is rejected and the previous state is kept.
    fn set_source(&mut self, data: Vec<T>) -> Result<(), MinMaxError>;

    /// Current contents of the backing array.
    fn source(&self) -> &[T];

    /// Minimum and maximum of `source[l..=r]`, reported as `f64`.
    fn query_range(&self, l: usize, r: usize) -> (f64, f64);

    /// Replace one element.
    fn update_element(&mut self, index: usize, value: T);

    /// Replace `source[from..to]` with `new_data[from_data..from_data + (to - from)]`.
    fn update_range(&mut self, from: usize, to: usize, new_data: &[T], from_data: usize);

    /// Replace `source[from..from + new_data.len()]` with `new_data`.
    fn update_data(&mut self, from: usize, new_data: &[T]) {
        self.update_range(from, from + new_data.len(), new_data, 0);
    }

    /// Single element, converted for reporting.
    fn source_element(&self, index: usize) -> f64 {
        self.source()[index].to_f64()
    }

    /// Number of samples in the backing array.
    fn len(&self) -> usize {
        self.source().len()
    }

    /// Whether the backing array is empty (never true after a successful load).
    fn is_empty(&self) -> bool {
        self.source().is_empty()
    }
}

pub(crate) fn check_source<T>(data: &[T]) -> Result<(), MinMaxError> {
    if data.is_empty() {
        return Err(MinMaxError::InvalidInput(
            "source array cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Which implementation a [`Strategy`] dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// [`LinearSearch`]
    Linear,
    /// [`SegmentTree`]
    Tree,
}

/// Tagged choice between the two implementations.
#[derive(Debug)]
pub enum Strategy<T: Sample> {
    /// Linear scan per query.
    Linear(LinearSearch<T>),
    /// Segment tree.
    Tree(SegmentTree<T>),
}

impl<T: Sample> Strategy<T> {
    /// Pick an implementation for `data`: a linear scan up to
    /// `config.linear_threshold` samples, a segment tree beyond that.
    pub fn choose(data: Vec<T>, config: &TreeConfig) -> Result<Self, MinMaxError> {
        if data.len() <= config.linear_threshold {
            Ok(Strategy::Linear(LinearSearch::new(data)?))
        } else {
            Ok(Strategy::Tree(SegmentTree::with_config(data, config.clone())?))
        }
    }

    /// Build a specific implementation.
    pub fn with_kind(
        kind: StrategyKind,
        data: Vec<T>,
        config: &TreeConfig,
    ) -> Result<Self, MinMaxError> {
        match kind {
            StrategyKind::Linear => Ok(Strategy::Linear(LinearSearch::new(data)?)),
            StrategyKind::Tree => Ok(Strategy::Tree(SegmentTree::with_config(data, config.clone())?)),
        }
    }

    /// Implementation in use.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Linear(_) => StrategyKind::Linear,
            Strategy::Tree(_) => StrategyKind::Tree,
        }
    }

    /// Whether queries are served by complete aggregate state.
    ///
    /// Always true for the linear scan, which has none.
    pub fn is_ready(&self) -> bool {
        match self {
            Strategy::Linear(_) => true,
            Strategy::Tree(tree) => tree.is_ready(),
        }
    }

    /// Hand the source back to the caller.
    pub fn into_source(self) -> Vec<T> {
        match self {
            Strategy::Linear(search) => search.into_source(),
            Strategy::Tree(tree) => tree.into_source(),
        }
    }
}

impl<T: Sample> MinMaxSearch<T> for Strategy<T> {
    fn set_source(&mut self, data: Vec<T>) -> Result<(), MinMaxError> {
        match self {
            Strategy::Linear(search) => search.set_source(data),
            Strategy::Tree(tree) => tree.set_source(data),
        }
    }

    fn source(&self) -> &[T] {
        match self {
            Strategy::Linear(search) => search.source(),
            Strategy::Tree(tree) => tree.source(),
        }
    }

    fn query_range(&self, l: usize, r: usize) -> (f64, f64) {
        match self {
            Strategy::Linear(search) => search.query_range(l, r),
            Strategy::Tree(tree) => tree.query_range(l, r),
        }
    }

    fn update_element(&mut self, index: usize, value: T) {
        match self {
            Strategy::Linear(search) => search.update_element(index, value),
            Strategy::Tree(tree) => tree.update_element(index, value),
        }
    }

    fn update_range(&mut self, from: usize, to: usize, new_data: &[T], from_data: usize) {
        match self {
            Strategy::Linear(search) => search.update_range(from, to, new_data, from_data),
            Strategy::Tree(tree) => tree.update_range(from, to, new_data, from_data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choose_uses_threshold() {
        let config = TreeConfig::default().with_linear_threshold(4);

        let small = Strategy::choose(vec![1, 2, 3, 4], &config).unwrap();
        assert_eq!(small.kind(), StrategyKind::Linear);

        let large = Strategy::choose(vec![1, 2, 3, 4, 5], &config).unwrap();
        assert_eq!(large.kind(), StrategyKind::Tree);
        assert!(large.is_ready());
    }

    #[test]
    fn both_kinds_answer_identically() {
        let data = vec![2.5f64, -1.0, 7.25, 0.0, 3.0, 3.0, -8.5];
        let config = TreeConfig::default();
        let mut linear = Strategy::with_kind(StrategyKind::Linear, data.clone(), &config).unwrap();
        let mut tree = Strategy::with_kind(StrategyKind::Tree, data, &config).unwrap();

        linear.update_element(3, 11.0);
        tree.update_element(3, 11.0);
        linear.update_data(4, &[-20.0, 1.0]);
        tree.update_data(4, &[-20.0, 1.0]);

        for l in 0..linear.len() {
            for r in l..linear.len() {
                assert_eq!(linear.query_range(l, r), tree.query_range(l, r), "[{l}, {r}]");
            }
        }
        assert_eq!(linear.source(), tree.source());
        assert_eq!(tree.source_element(4), -20.0);
    }

    #[test]
    fn trait_objects_dispatch() {
        let searches: Vec<Box<dyn MinMaxSearch<u16>>> = vec![
            Box::new(LinearSearch::new(vec![4, 8, 15, 16, 23, 42]).unwrap()),
            Box::new(SegmentTree::new(vec![4, 8, 15, 16, 23, 42]).unwrap()),
        ];
        for search in &searches {
            assert_eq!(search.query_range(1, 4), (8.0, 23.0));
            assert_eq!(search.len(), 6);
            assert!(!search.is_empty());
        }
    }
}
