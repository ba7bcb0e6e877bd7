//! # Range Min/Max Search for Large Signals
//!
//! Rendering a signal with millions of samples needs, for every horizontal
//! pixel column, the lowest and highest sample that lands in that column.
//! A linear scan costs O(n) per column; this crate answers each column in
//! O(log n) after a one-time O(n) build.
//!
//! ## Core Structure
//!
//! 1. **Pair leaves**: each leaf of the tree aggregates two adjacent samples
//! 2. **Twin trees**: one heap-ordered array tracks minima, a parallel one maxima
//! 3. **Ready flag**: until both trees are complete, queries scan the source
//! 4. **Incremental updates**: point and range writes climb only as far as
//!    an ancestor actually changes
//!
//! ## Usage Example
//!
//! ```
//! use minmax_search::{MinMaxSearch, SegmentTree};
//!
//! let mut tree = SegmentTree::new(vec![3, 1, 4, 1, 5, 9, 2, 6])?;
//! assert_eq!(tree.query_range(0, 7), (1.0, 9.0));
//!
//! tree.update_element(5, 0);
//! assert_eq!(tree.query_range(0, 7), (0.0, 6.0));
//! # Ok::<(), minmax_search::MinMaxError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod sample;   // Numeric capability interface
pub mod strategy; // Query contract, linear scan, strategy selection
pub mod tree;     // Pair-leaf segment tree engine
/// Python bindings for exposing the tree to plotting front-ends.
#[cfg(feature = "python-bindings")]
pub mod python_bindings;

// Re-exports for convenience
pub use sample::Sample;
pub use strategy::{LinearSearch, MinMaxSearch, Strategy, StrategyKind};
pub use tree::SegmentTree;
#[cfg(feature = "visualize")]
pub use tree::TreeSnapshot;

use thiserror::Error;

/// Largest supported source length (2^30 samples).
pub const MAX_SOURCE_LEN: usize = 1 << 30;

/// Default size at or below which [`Strategy::choose`] keeps a linear scan.
pub const DEFAULT_LINEAR_THRESHOLD: usize = 4096;

/// How a segment tree builds its aggregate arrays after a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Build on the calling thread before returning.
    #[default]
    Blocking,
    /// Submit the build to a worker thread; queries scan linearly until done.
    Background,
}

/// Configuration parameters for search structures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Longest source accepted by a build
    pub max_len: usize,

    /// Where builds run
    pub build_mode: BuildMode,

    /// Sources this short or shorter are served by a linear scan
    pub linear_threshold: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_len: MAX_SOURCE_LEN,
            build_mode: BuildMode::Blocking,
            linear_threshold: DEFAULT_LINEAR_THRESHOLD,
        }
    }
}

impl TreeConfig {
    /// Configuration that builds trees on a worker thread.
    pub fn background() -> Self {
        Self {
            build_mode: BuildMode::Background,
            ..Self::default()
        }
    }

    /// Override the longest accepted source.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Override the build mode.
    pub fn with_build_mode(mut self, build_mode: BuildMode) -> Self {
        self.build_mode = build_mode;
        self
    }

    /// Override the linear-scan threshold.
    pub fn with_linear_threshold(mut self, linear_threshold: usize) -> Self {
        self.linear_threshold = linear_threshold;
        self
    }

    /// Check that the limits are usable.
    pub fn validate(&self) -> Result<(), MinMaxError> {
        if self.max_len == 0 || self.max_len > MAX_SOURCE_LEN {
            return Err(MinMaxError::InvalidInput(format!(
                "max_len must be in 1..={MAX_SOURCE_LEN}, got {}",
                self.max_len
            )));
        }
        Ok(())
    }
}

/// Errors reported by loads and builds
///
/// Index violations on queries and updates are caller bugs and panic instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MinMaxError {
    /// Source or configuration was rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Source is longer than the supported bound
    #[error("Source length {len} exceeds supported maximum {max}")]
    CapacityExceeded {
        /// Length of the rejected source
        len: usize,
        /// Bound that was exceeded
        max: usize,
    },

    /// Tree storage could not be allocated
    #[error("Could not allocate {nodes} tree nodes")]
    ResourceExhausted {
        /// Nodes requested per tree
        nodes: usize,
    },

    /// A background build did not complete
    #[error("Build aborted: {0}")]
    BuildAborted(String),
}
