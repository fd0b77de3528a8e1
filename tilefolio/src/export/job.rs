//! Export job description.

use tokio_util::sync::CancellationToken;

use super::ExportError;
use crate::grid::GridCell;
use crate::provider::BasemapSource;
use crate::zoom::ResolutionMode;

/// Everything one export run needs.
///
/// The cells and the basemap are owned by the job, so they cannot change
/// while it runs. Cancellation goes through a shared token that any task can
/// trip; the orchestrator checks it before each cell.
#[derive(Debug, Clone)]
pub struct ExportJob {
    cells: Vec<GridCell>,
    source: BasemapSource,
    resolution: ResolutionMode,
    zoom_override: Option<i32>,
    cancel: CancellationToken,
}

impl ExportJob {
    pub fn new(cells: Vec<GridCell>, source: BasemapSource) -> Self {
        Self {
            cells,
            source,
            resolution: ResolutionMode::default(),
            zoom_override: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_resolution(mut self, resolution: ResolutionMode) -> Self {
        self.resolution = resolution;
        self
    }

    /// Requests a fixed zoom; it is still clamped per cell.
    pub fn with_zoom_override(mut self, zoom: Option<i32>) -> Self {
        self.zoom_override = zoom;
        self
    }

    /// Uses an existing token, e.g. one wired to Ctrl-C.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn total(&self) -> usize {
        self.cells.len()
    }

    pub fn source(&self) -> &BasemapSource {
        &self.source
    }

    pub fn resolution(&self) -> ResolutionMode {
        self.resolution
    }

    pub fn zoom_override(&self) -> Option<i32> {
        self.zoom_override
    }

    /// A handle that cancels this job when tripped.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Checks the job can start: at least one cell and a usable template.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.cells.is_empty() {
            return Err(ExportError::Config(
                "no grid cells to export; create a grid first".to_string(),
            ));
        }
        self.source
            .validate()
            .map_err(|e| ExportError::Config(e.to_string()))
    }
}
