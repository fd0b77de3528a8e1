//! Grid export.
//!
//! An [`ExportJob`] carries the cells, the basemap and the resolution
//! settings; [`ExportOrchestrator::run`] renders the cells one by one and
//! writes one page per cell to a [`PageSink`](crate::document::PageSink).
//!
//! # Outcomes
//!
//! | Event                    | Status                      | Document               |
//! |--------------------------|-----------------------------|------------------------|
//! | every cell rendered      | `Completed { pages }`       | saved, one page a cell |
//! | cancel at a cell boundary| `Cancelled`                 | discarded              |
//! | render or page error     | `Failed { pages, reason }`  | pages so far saved     |
//! | save error               | `Failed { pages: 0, .. }`   | not written            |

mod job;
mod orchestrator;
mod progress;
mod status;

pub use job::ExportJob;
pub use orchestrator::{CellRenderer, ExportOrchestrator};
pub use progress::{
    CallbackObserver, ExportObserver, ExportProgress, FinishedCallback, NoopObserver,
    ProgressCallback,
};
pub use status::{ExportState, ExportStatus};

use thiserror::Error;

/// Reasons a job cannot start.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export or no usable tile source
    #[error("export configuration error: {0}")]
    Config(String),

    /// Another job holds the export lock
    #[error("an export is already running")]
    Busy,
}
