//! Tree builds submitted to a worker thread
//!
//! The worker owns a shared handle on the source and publishes the finished
//! pair of trees in one step. Readers check the slot; an empty slot means
//! "not ready" and they scan the source instead.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use tracing::debug;

use super::layout::Trees;
use crate::sample::Sample;
use crate::MinMaxError;

const WORKER_NAME: &str = "minmax-tree-build";

struct BuildSlot<T: Sample> {
    trees: OnceLock<Trees<T>>,
    cancel: AtomicBool,
}

pub(crate) struct PendingBuild<T: Sample> {
    slot: Arc<BuildSlot<T>>,
    handle: JoinHandle<Result<(), MinMaxError>>,
}

impl<T: Sample> PendingBuild<T> {
    /// Start building trees over `source` on a new worker thread.
    pub(crate) fn spawn(source: Arc<Vec<T>>) -> io::Result<Self> {
        let slot = Arc::new(BuildSlot {
            trees: OnceLock::new(),
            cancel: AtomicBool::new(false),
        });
        let worker_slot = Arc::clone(&slot);
        let handle = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || -> Result<(), MinMaxError> {
                let trees = Trees::build(source.as_slice(), Some(&worker_slot.cancel))?;
                // Both arrays become visible together or not at all.
                let _ = worker_slot.trees.set(trees);
                Ok(())
            })?;
        debug!(worker = WORKER_NAME, "background build submitted");
        Ok(Self { slot, handle })
    }

    /// Finished trees, once the worker has published them.
    pub(crate) fn published(&self) -> Option<&Trees<T>> {
        self.slot.trees.get()
    }

    /// Ask the worker to stop at its next level boundary.
    pub(crate) fn cancel(&self) {
        self.slot.cancel.store(true, Ordering::Relaxed);
    }

    /// Wait for the worker and take ownership of its trees.
    pub(crate) fn finish(self) -> Result<Trees<T>, MinMaxError> {
        self.handle
            .join()
            .map_err(|_| MinMaxError::BuildAborted("build worker panicked".to_string()))??;
        // The worker dropped its handle on the slot before exiting.
        let slot = Arc::try_unwrap(self.slot)
            .map_err(|_| MinMaxError::BuildAborted("build slot still shared".to_string()))?;
        slot.trees.into_inner().ok_or_else(|| {
            MinMaxError::BuildAborted("worker exited without publishing trees".to_string())
        })
    }
}

impl<T: Sample> fmt::Debug for PendingBuild<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingBuild")
            .field("published", &self.slot.trees.get().is_some())
            .field("cancelled", &self.slot.cancel.load(Ordering::Relaxed))
            .finish()
    }
}
