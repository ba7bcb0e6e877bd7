//! Pair-leaf segment tree for range min/max queries
//!
//! Two parallel heap-ordered arrays (minima and maxima) over a power-of-two
//! leaf layer. O(n) build, O(log n) queries, and updates that stop climbing
//! as soon as an ancestor keeps its value.
//!
//! While the trees are missing (build in flight, failed, or discarded) every
//! query falls back to a linear scan of the source, so answers are always
//! correct, only slower.

mod background;
mod layout;
mod query;
mod update;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use background::PendingBuild;
use layout::{capacity_for, Trees};

use crate::sample::{report, Sample};
use crate::strategy::{check_source, scan_min_max, MinMaxSearch};
use crate::{BuildMode, MinMaxError, TreeConfig};

/// Segment tree strategy over an owned source array.
///
/// The source is shared with at most one background build job and is never
/// copied. Mutate it only through the update methods; every `&mut self`
/// operation first waits for a build in flight.
pub struct SegmentTree<T: Sample> {
    source: Arc<Vec<T>>,
    trees: Option<Trees<T>>,
    pending: Option<PendingBuild<T>>,
    config: TreeConfig,
}

impl<T: Sample> SegmentTree<T> {
    /// Build a tree over `data` with the default configuration.
    pub fn new(data: Vec<T>) -> Result<Self, MinMaxError> {
        Self::with_config(data, TreeConfig::default())
    }

    /// Build a tree over `data`.
    ///
    /// Empty or oversized sources are rejected. An allocation failure is not:
    /// the tree is returned not-ready and serves queries by linear scan until
    /// a later [`rebuild`](Self::rebuild) succeeds.
    pub fn with_config(data: Vec<T>, config: TreeConfig) -> Result<Self, MinMaxError> {
        config.validate()?;
        check_source(&data)?;
        check_capacity(data.len(), config.max_len)?;

        let mut tree = Self {
            source: Arc::new(data),
            trees: None,
            pending: None,
            config,
        };
        if let Err(err) = tree.start_build() {
            debug!(%err, "initial build failed, serving queries by linear scan");
        }
        Ok(tree)
    }

    /// Configuration in effect.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Whether both trees are complete and serving queries.
    pub fn is_ready(&self) -> bool {
        self.ready_trees().is_some()
    }

    /// Slots per tree: the smallest power of two covering the source.
    pub fn capacity(&self) -> usize {
        capacity_for(self.source.len())
    }

    /// Minimum tree, when ready.
    pub fn tree_min(&self) -> Option<&[T]> {
        self.ready_trees().map(|trees| trees.min.as_slice())
    }

    /// Maximum tree, when ready.
    pub fn tree_max(&self) -> Option<&[T]> {
        self.ready_trees().map(|trees| trees.max.as_slice())
    }

    /// Whether the trees are ready and agree with the source everywhere.
    pub fn is_consistent(&self) -> bool {
        self.ready_trees()
            .is_some_and(|trees| trees.is_consistent(self.source.as_slice()))
    }

    /// Rebuild both trees on the calling thread.
    ///
    /// On error the tree is left not-ready; queries keep working by linear
    /// scan and the caller may retry.
    pub fn rebuild(&mut self) -> Result<(), MinMaxError> {
        check_capacity(self.source.len(), self.config.max_len)?;
        self.abandon_pending();
        self.build_now()
    }

    /// Rebuild both trees on a worker thread.
    ///
    /// Returns once the job is submitted. Queries are answered by linear scan
    /// until the worker publishes the finished trees; use
    /// [`wait_ready`](Self::wait_ready) to observe the outcome.
    pub fn rebuild_in_background(&mut self) -> Result<(), MinMaxError> {
        check_capacity(self.source.len(), self.config.max_len)?;
        self.abandon_pending();
        self.spawn_build()
    }

    /// Block until a build in flight finishes and report its outcome.
    ///
    /// Returns `Ok` immediately when no build is in flight.
    pub fn wait_ready(&mut self) -> Result<(), MinMaxError> {
        self.settle()
    }

    /// Drop both trees; queries fall back to a linear scan until the next
    /// rebuild.
    pub fn discard_trees(&mut self) {
        self.abandon_pending();
        self.trees = None;
        debug!("trees discarded");
    }

    /// Hand the source back to the caller.
    pub fn into_source(mut self) -> Vec<T> {
        self.abandon_pending();
        let source = std::mem::take(&mut self.source);
        Arc::try_unwrap(source).unwrap_or_else(|shared| shared.as_ref().clone())
    }

    /// Point-in-time copy of both trees, for inspection.
    #[cfg(feature = "visualize")]
    pub fn snapshot(&self) -> TreeSnapshot {
        let to_f64 = |values: &[T]| values.iter().map(|v| v.to_f64()).collect::<Vec<_>>();
        let trees = self.ready_trees();
        TreeSnapshot {
            len: self.source.len(),
            capacity: self.capacity(),
            ready: trees.is_some(),
            tree_min: trees.map(|t| to_f64(t.min.as_slice())).unwrap_or_default(),
            tree_max: trees.map(|t| to_f64(t.max.as_slice())).unwrap_or_default(),
        }
    }

    fn ready_trees(&self) -> Option<&Trees<T>> {
        self.trees
            .as_ref()
            .or_else(|| self.pending.as_ref().and_then(PendingBuild::published))
    }

    fn start_build(&mut self) -> Result<(), MinMaxError> {
        match self.config.build_mode {
            BuildMode::Blocking => self.build_now(),
            BuildMode::Background => self.spawn_build(),
        }
    }

    fn build_now(&mut self) -> Result<(), MinMaxError> {
        self.trees = None;
        match Trees::build(self.source.as_slice(), None) {
            Ok(trees) => {
                self.trees = Some(trees);
                Ok(())
            }
            Err(err) => {
                warn!(%err, len = self.source.len(), "tree build failed");
                Err(err)
            }
        }
    }

    fn spawn_build(&mut self) -> Result<(), MinMaxError> {
        self.trees = None;
        match PendingBuild::spawn(Arc::clone(&self.source)) {
            Ok(pending) => {
                self.pending = Some(pending);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "could not start build worker, building inline");
                self.build_now()
            }
        }
    }

    /// Join a build in flight and install its trees.
    fn settle(&mut self) -> Result<(), MinMaxError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        match pending.finish() {
            Ok(trees) => {
                self.trees = Some(trees);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "background build did not complete");
                self.trees = None;
                Err(err)
            }
        }
    }

    /// Settle before a write. A failed build only leaves the tree not-ready,
    /// which the write path already handles.
    fn settle_for_write(&mut self) -> &mut Vec<T> {
        if let Err(err) = self.settle() {
            debug!(%err, "writing to a not-ready tree");
        }
        // No build holds the source any more, so this never clones.
        Arc::make_mut(&mut self.source)
    }

    /// Cancel a build in flight and discard whatever it produced.
    fn abandon_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
            if let Err(err) = pending.finish() {
                debug!(%err, "abandoned background build");
            }
        }
    }
}

fn check_capacity(len: usize, max: usize) -> Result<(), MinMaxError> {
    if len > max {
        return Err(MinMaxError::CapacityExceeded { len, max });
    }
    Ok(())
}

impl<T: Sample> MinMaxSearch<T> for SegmentTree<T> {
    /// Replace the source and rebuild per the configured [`BuildMode`].
    ///
    /// Empty or oversized data is rejected and the previous source and trees
    /// are kept. Otherwise the new source is installed even if the build
    /// then fails; the error is returned and the tree stays not-ready.
    fn set_source(&mut self, data: Vec<T>) -> Result<(), MinMaxError> {
        check_source(&data)?;
        check_capacity(data.len(), self.config.max_len)?;
        self.abandon_pending();
        self.source = Arc::new(data);
        self.start_build()
    }

    fn source(&self) -> &[T] {
        self.source.as_slice()
    }

    fn query_range(&self, l: usize, r: usize) -> (f64, f64) {
        let bounds = match self.ready_trees() {
            Some(trees) => trees.query(self.source.as_slice(), l, r),
            None => scan_min_max(self.source.as_slice(), l, r),
        };
        report(bounds)
    }

    fn update_element(&mut self, index: usize, value: T) {
        trace!(index, "point update");
        let source = self.settle_for_write();
        source[index] = value;
        if let Some(trees) = self.trees.as_mut() {
            trees.update_point(self.source.as_slice(), index);
        }
    }

    fn update_range(&mut self, from: usize, to: usize, new_data: &[T], from_data: usize) {
        if from >= to {
            return;
        }
        trace!(from, to, "range update");
        let source = self.settle_for_write();
        source[from..to].copy_from_slice(&new_data[from_data..from_data + (to - from)]);
        if let Some(trees) = self.trees.as_mut() {
            trees.update_span(self.source.as_slice(), from, to);
        }
    }
}

impl<T: Sample> Drop for SegmentTree<T> {
    fn drop(&mut self) {
        self.abandon_pending();
    }
}

impl<T: Sample> fmt::Debug for SegmentTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentTree")
            .field("len", &self.source.len())
            .field("capacity", &self.capacity())
            .field("ready", &self.is_ready())
            .field("pending", &self.pending)
            .field("config", &self.config)
            .finish()
    }
}

/// Serializable view of a tree's state.
#[cfg(feature = "visualize")]
#[derive(Debug, Clone, serde::Serialize)]
pub struct TreeSnapshot {
    /// Source length
    pub len: usize,
    /// Slots per tree
    pub capacity: usize,
    /// Whether the trees were ready
    pub ready: bool,
    /// Minimum tree, empty when not ready
    pub tree_min: Vec<f64>,
    /// Maximum tree, empty when not ready
    pub tree_max: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> SegmentTree<i32> {
        SegmentTree::new(vec![3, 1, 4, 1, 5, 9, 2, 6]).unwrap()
    }

    #[test]
    fn test_pixel_column_scenario() {
        let mut tree = scenario();
        assert!(tree.is_ready());
        assert_eq!(tree.capacity(), 8);
        assert_eq!(tree.query_range(0, 7), (1.0, 9.0));

        tree.update_element(5, 0);
        assert_eq!(tree.query_range(0, 7), (0.0, 6.0));
        assert_eq!(tree.query_range(2, 4), (1.0, 5.0));
        assert!(tree.is_consistent());
    }

    #[test]
    fn test_single_sample() {
        let mut tree = SegmentTree::new(vec![-2.5f64]).unwrap();
        assert_eq!(tree.query_range(0, 0), (-2.5, -2.5));
        tree.update_element(0, 4.0);
        assert_eq!(tree.query_range(0, 0), (4.0, 4.0));
        assert_eq!(tree.source_element(0), 4.0);
    }

    #[test]
    fn test_rejects_bad_sources() {
        assert!(matches!(
            SegmentTree::<u8>::new(Vec::new()),
            Err(MinMaxError::InvalidInput(_))
        ));

        let config = TreeConfig::default().with_max_len(4);
        assert_eq!(
            SegmentTree::with_config(vec![0u8; 5], config).unwrap_err(),
            MinMaxError::CapacityExceeded { len: 5, max: 4 }
        );
    }

    #[test]
    fn test_rejected_load_keeps_previous_state() {
        let config = TreeConfig::default().with_max_len(8);
        let mut tree = SegmentTree::with_config(vec![1, 2, 3], config).unwrap();

        assert!(tree.set_source(Vec::new()).is_err());
        assert!(matches!(
            tree.set_source(vec![0; 9]),
            Err(MinMaxError::CapacityExceeded { .. })
        ));
        assert_eq!(tree.source(), &[1, 2, 3]);
        assert!(tree.is_ready());
        assert_eq!(tree.query_range(0, 2), (1.0, 3.0));
    }

    #[test]
    fn test_discarded_trees_fall_back_to_scan() {
        let mut tree = scenario();
        tree.discard_trees();
        assert!(!tree.is_ready());
        assert!(tree.tree_min().is_none());
        assert_eq!(tree.query_range(0, 7), (1.0, 9.0));
        assert_eq!(tree.query_range(6, 7), (2.0, 6.0));

        // Writes while not ready only touch the source
        tree.update_element(1, -7);
        assert_eq!(tree.query_range(0, 3), (-7.0, 4.0));

        tree.rebuild().unwrap();
        assert!(tree.is_consistent());
        assert_eq!(tree.query_range(0, 3), (-7.0, 4.0));
    }

    #[test]
    fn test_range_update_with_offset() {
        let mut tree = scenario();
        tree.update_range(1, 4, &[0, 0, 10, 20, 30], 2);
        assert_eq!(tree.source(), &[3, 10, 20, 30, 5, 9, 2, 6]);
        assert_eq!(tree.query_range(0, 3), (3.0, 30.0));
        assert!(tree.is_consistent());
    }

    #[test]
    fn test_background_rebuild() {
        let data: Vec<u32> = (0..10_000).map(|i| (i * 7919) % 10_007).collect();
        let mut tree = SegmentTree::with_config(data, TreeConfig::background()).unwrap();

        // Answers are correct whether or not the worker has finished.
        assert_eq!(tree.query_range(0, 9_999), (0.0, 10_006.0));

        tree.wait_ready().unwrap();
        assert!(tree.is_ready());
        assert!(tree.is_consistent());

        tree.rebuild_in_background().unwrap();
        tree.update_element(0, 20_000);
        assert!(tree.is_ready());
        assert_eq!(tree.query_range(0, 1), (7919.0, 20_000.0));
    }

    #[cfg(feature = "visualize")]
    #[test]
    fn test_snapshot_reports_trees() {
        let mut tree = SegmentTree::new(vec![2u8, 7, 1]).unwrap();
        let snapshot = tree.snapshot();
        assert!(snapshot.ready);
        assert_eq!(snapshot.capacity, 4);
        assert_eq!(&snapshot.tree_min[1..], &[1.0, 2.0, 1.0]);
        assert_eq!(&snapshot.tree_max[1..], &[7.0, 7.0, 1.0]);

        tree.discard_trees();
        assert!(tree.snapshot().tree_min.is_empty());
    }

    #[test]
    fn test_exhausted_memory_leaves_a_working_tree() {
        layout::refuse_next_allocation();
        let mut tree = scenario();
        assert!(!tree.is_ready());
        assert!(tree.tree_max().is_none());
        assert_eq!(tree.query_range(0, 7), (1.0, 9.0));
        assert_eq!(tree.query_range(3, 6), (1.0, 9.0));

        layout::refuse_next_allocation();
        assert_eq!(
            tree.rebuild().unwrap_err(),
            MinMaxError::ResourceExhausted { nodes: 8 }
        );
        assert!(!tree.is_ready());

        layout::refuse_next_allocation();
        assert!(matches!(
            tree.set_source(vec![8, 6, 7]),
            Err(MinMaxError::ResourceExhausted { .. })
        ));
        assert_eq!(tree.query_range(0, 2), (6.0, 8.0));

        tree.rebuild().unwrap();
        assert!(tree.is_consistent());
        assert_eq!(tree.query_range(1, 2), (6.0, 7.0));
    }

    #[test]
    fn test_drop_joins_build_worker() {
        let data: Vec<i64> = (0..1 << 20).collect();
        let tree = SegmentTree::with_config(data, TreeConfig::background()).unwrap();
        let shared = Arc::clone(&tree.source);
        drop(tree);
        // The worker's handle on the source is gone once it has exited.
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn test_into_source_returns_updates() {
        let mut tree = scenario();
        tree.update_data(6, &[-1, -1]);
        assert_eq!(tree.into_source(), vec![3, 1, 4, 1, 5, 9, -1, -1]);
    }
}
