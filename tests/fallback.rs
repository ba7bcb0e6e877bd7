//! Not-ready trees and background builds must never change answers

mod common;

use common::{brute_force, sawtooth};
use minmax_search::{
    BuildMode, MinMaxError, MinMaxSearch, SegmentTree, Strategy, StrategyKind, TreeConfig,
};

#[test]
fn discarded_trees_answer_by_scan() {
    let data = sawtooth(1000, 37);
    let mut tree = SegmentTree::new(data.clone()).unwrap();
    tree.discard_trees();
    assert!(!tree.is_ready());
    assert!(!tree.is_consistent());

    for (l, r) in [(0, 999), (5, 6), (17, 512), (998, 999), (500, 500)] {
        assert_eq!(tree.query_range(l, r), brute_force(&data, l, r));
    }
}

#[test]
fn stale_trees_are_never_read() {
    let mut tree = SegmentTree::new(vec![10, 20, 30, 40]).unwrap();
    tree.discard_trees();
    tree.update_range(0, 4, &[4, 3, 2, 1], 0);
    assert_eq!(tree.query_range(0, 3), (1.0, 4.0));

    tree.rebuild().unwrap();
    assert_eq!(tree.query_range(1, 2), (2.0, 3.0));
}

#[test]
fn background_build_serves_queries_throughout() {
    let data = sawtooth(200_000, 1009);
    let mut tree = SegmentTree::with_config(data.clone(), TreeConfig::background()).unwrap();

    // Whatever the worker's progress, every answer is exact.
    for col in 0..64 {
        let l = col * 3125;
        let r = l + 3124;
        assert_eq!(tree.query_range(l, r), brute_force(&data, l, r));
    }

    tree.wait_ready().unwrap();
    assert!(tree.is_ready());
    assert!(tree.is_consistent());
}

#[test]
fn set_source_replaces_a_build_in_flight() {
    let config = TreeConfig::default().with_build_mode(BuildMode::Background);
    let mut tree = SegmentTree::with_config(sawtooth(100_000, 11), config).unwrap();

    let replacement = sawtooth(5000, 101);
    tree.set_source(replacement.clone()).unwrap();
    tree.wait_ready().unwrap();

    assert_eq!(tree.source(), replacement.as_slice());
    assert!(tree.is_consistent());
    assert_eq!(tree.query_range(0, 4999), brute_force(&replacement, 0, 4999));
}

#[test]
fn writes_wait_for_the_worker() {
    let mut tree = SegmentTree::with_config(sawtooth(50_000, 97), TreeConfig::background()).unwrap();
    tree.update_element(25_000, 1_000);
    assert!(tree.is_ready());
    assert_eq!(tree.query_range(0, 49_999), (-48.0, 1000.0));
    assert!(tree.is_consistent());
}

#[test]
fn capacity_bound_is_enforced() {
    let config = TreeConfig::default().with_max_len(1024);
    let mut tree = SegmentTree::with_config(vec![1u8; 1024], config.clone()).unwrap();
    assert_eq!(tree.capacity(), 1024);

    let err = tree.set_source(vec![1u8; 1025]).unwrap_err();
    assert_eq!(err, MinMaxError::CapacityExceeded { len: 1025, max: 1024 });
    assert_eq!(tree.len(), 1024);
    assert!(tree.is_ready());

    let err = Strategy::with_kind(StrategyKind::Tree, vec![0u8; 2000], &config).unwrap_err();
    assert!(matches!(err, MinMaxError::CapacityExceeded { .. }));
}

#[test]
fn invalid_config_is_rejected() {
    let config = TreeConfig::default().with_max_len(0);
    assert!(matches!(
        SegmentTree::with_config(vec![1, 2, 3], config),
        Err(MinMaxError::InvalidInput(_))
    ));
}
