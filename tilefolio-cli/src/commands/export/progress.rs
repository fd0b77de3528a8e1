//! Terminal progress bar for an export.

use indicatif::{ProgressBar, ProgressStyle};
use tilefolio::export::{ExportObserver, ExportProgress, ExportStatus};
use tilefolio::grid::GridCell;

const TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} pages {msg}";

/// Drives an indicatif bar from export events.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        Self { bar }
    }

    #[cfg(test)]
    fn hidden(total: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total as u64);
        Self { bar }
    }
}

impl ExportObserver for ProgressObserver {
    fn on_cell_started(&self, _index: usize, _total: usize, cell: &GridCell, zoom: u8) {
        self.bar
            .set_message(format!("rendering {} at z{}", cell.label(), zoom));
    }

    fn on_progress(&self, progress: &ExportProgress) {
        self.bar.set_position(progress.index as u64);
        self.bar
            .set_message(format!("{} tiles fetched", progress.cumulative_tiles));
    }

    fn on_finished(&self, status: &ExportStatus) {
        match status {
            ExportStatus::Completed { .. } => self.bar.finish_with_message("done"),
            ExportStatus::Cancelled => self.bar.abandon_with_message("cancelled"),
            ExportStatus::Failed { .. } => self.bar.abandon_with_message("failed"),
        }
    }
}
