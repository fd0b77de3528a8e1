//! Progress reporting for export jobs.

use super::ExportStatus;
use crate::grid::GridCell;

/// Progress after a cell has been added to the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportProgress {
    /// Cells done, 1-based
    pub index: usize,
    pub total: usize,
    /// Tiles requested for the cell just finished
    pub tile_count: usize,
    /// Tiles requested so far across the job
    pub cumulative_tiles: usize,
    /// `index / total`
    pub fraction: f64,
}

impl ExportProgress {
    pub fn new(index: usize, total: usize, tile_count: usize, cumulative_tiles: usize) -> Self {
        let fraction = if total > 0 {
            index as f64 / total as f64
        } else {
            0.0
        };
        Self {
            index,
            total,
            tile_count,
            cumulative_tiles,
            fraction,
        }
    }
}

/// Receives export events.
///
/// Called from the task running the job, once per event and in order.
pub trait ExportObserver: Send + Sync {
    /// A cell is about to be rendered at `zoom`.
    fn on_cell_started(&self, _index: usize, _total: usize, _cell: &GridCell, _zoom: u8) {}

    /// A cell's page has been added.
    fn on_progress(&self, progress: &ExportProgress);

    /// The job reached a terminal status. Called exactly once per job.
    fn on_finished(&self, status: &ExportStatus);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExportObserver for NoopObserver {
    fn on_progress(&self, _progress: &ExportProgress) {}

    fn on_finished(&self, _status: &ExportStatus) {}
}

/// Called after each cell.
pub type ProgressCallback = Box<dyn Fn(&ExportProgress) + Send + Sync>;

/// Called once with the terminal status.
pub type FinishedCallback = Box<dyn Fn(&ExportStatus) + Send + Sync>;

/// Adapts closures to [`ExportObserver`].
#[derive(Default)]
pub struct CallbackObserver {
    on_progress: Option<ProgressCallback>,
    on_finished: Option<FinishedCallback>,
}

impl CallbackObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ExportProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn with_finished<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ExportStatus) + Send + Sync + 'static,
    {
        self.on_finished = Some(Box::new(callback));
        self
    }
}

impl ExportObserver for CallbackObserver {
    fn on_progress(&self, progress: &ExportProgress) {
        if let Some(callback) = &self.on_progress {
            callback(progress);
        }
    }

    fn on_finished(&self, status: &ExportStatus) {
        if let Some(callback) = &self.on_finished {
            callback(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_fraction() {
        let progress = ExportProgress::new(2, 5, 12, 30);
        assert!((progress.fraction - 0.4).abs() < 1e-12);
        assert_eq!(ExportProgress::new(0, 0, 0, 0).fraction, 0.0);
    }

    #[test]
    fn test_callback_observer_forwards() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_progress = Arc::clone(&seen);
        let observer = CallbackObserver::new().with_progress(move |p| {
            seen_progress.fetch_add(p.tile_count, Ordering::SeqCst);
        });

        observer.on_progress(&ExportProgress::new(1, 2, 7, 7));
        observer.on_progress(&ExportProgress::new(2, 2, 5, 12));
        observer.on_finished(&ExportStatus::Completed { pages: 2 });
        assert_eq!(seen.load(Ordering::SeqCst), 12);
    }
}
