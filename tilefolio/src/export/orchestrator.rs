//! Export orchestration.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info, instrument, warn};

use super::{ExportError, ExportJob, ExportObserver, ExportProgress, ExportState, ExportStatus};
use crate::document::PageSink;
use crate::grid::GridCell;
use crate::mosaic::{RenderError, RenderedCell, TileMosaicRenderer};
use crate::provider::{AsyncHttpClient, BasemapSource};
use crate::zoom::{base_size, resolve_zoom, MAX_PAGE_SIDE};

/// Produces the raster for one cell.
pub trait CellRenderer: Send + Sync {
    fn render(
        &self,
        cell: &GridCell,
        zoom: u8,
        source: &BasemapSource,
        target_side: u32,
    ) -> impl Future<Output = Result<RenderedCell, RenderError>> + Send;
}

impl<C: AsyncHttpClient> CellRenderer for TileMosaicRenderer<C> {
    async fn render(
        &self,
        cell: &GridCell,
        zoom: u8,
        source: &BasemapSource,
        target_side: u32,
    ) -> Result<RenderedCell, RenderError> {
        TileMosaicRenderer::render(self, &cell.bbox, zoom, source, target_side).await
    }
}

/// Runs export jobs, one at a time.
///
/// Cells are processed strictly in order, so at most one cell's mosaic is in
/// memory. Cancellation is checked before each cell and discards everything;
/// a failure keeps and saves the pages produced before it.
pub struct ExportOrchestrator<R> {
    renderer: R,
    lock: Arc<AsyncMutex<()>>,
    state: Arc<Mutex<ExportState>>,
}

impl<C: AsyncHttpClient> ExportOrchestrator<TileMosaicRenderer<C>> {
    /// Orchestrator backed by the HTTP tile renderer.
    pub fn with_mosaic(client: C) -> Self {
        Self::new(TileMosaicRenderer::new(client))
    }
}

impl<R: CellRenderer> ExportOrchestrator<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            lock: Arc::new(AsyncMutex::new(())),
            state: Arc::new(Mutex::new(ExportState::Idle)),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ExportState {
        self.state.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().is_running()
    }

    /// Runs `job`, writing pages to `sink`.
    ///
    /// Returns `Err` only when the job cannot start: no cells, an unusable
    /// tile template, or another job already running. Everything after
    /// that is reported through the returned [`ExportStatus`] and
    /// [`ExportObserver::on_finished`].
    #[instrument(skip_all, fields(cells = job.total(), basemap = %job.source().name))]
    pub async fn run<S, O>(
        &self,
        job: ExportJob,
        sink: &mut S,
        observer: &O,
    ) -> Result<ExportStatus, ExportError>
    where
        S: PageSink + ?Sized,
        O: ExportObserver + ?Sized,
    {
        job.validate()?;
        let _guard = Arc::clone(&self.lock)
            .try_lock_owned()
            .map_err(|_| ExportError::Busy)?;

        let total = job.total();
        let target_side = MAX_PAGE_SIDE.min(base_size(job.resolution(), total));
        self.set_state(ExportState::Running {
            completed: 0,
            total,
        });
        info!(
            total,
            resolution = %job.resolution(),
            target_side,
            zoom_override = ?job.zoom_override(),
            "Export started"
        );

        let mut cumulative_tiles = 0;
        for (index, cell) in job.cells().iter().enumerate() {
            if job.is_cancelled() {
                info!(completed = index, total, "Export cancelled, discarding pages");
                sink.discard();
                return Ok(self.conclude(ExportStatus::Cancelled, observer));
            }

            let zoom = resolve_zoom(
                &cell.bbox,
                job.source(),
                job.zoom_override(),
                job.resolution(),
                total,
            );
            observer.on_cell_started(index, total, cell, zoom);

            let rendered = match self.renderer.render(cell, zoom, job.source(), target_side).await
            {
                Ok(rendered) => rendered,
                Err(e) => {
                    let reason = format!("cell {} failed to render: {}", cell.label(), e);
                    return Ok(self.salvage(sink, reason, observer));
                }
            };

            if let Err(e) = sink.add_page(&rendered.image) {
                let reason = format!("cell {} could not be added: {}", cell.label(), e);
                return Ok(self.salvage(sink, reason, observer));
            }

            cumulative_tiles += rendered.tile_count;
            let progress =
                ExportProgress::new(index + 1, total, rendered.tile_count, cumulative_tiles);
            self.set_state(ExportState::Running {
                completed: index + 1,
                total,
            });
            info!(
                cell = %cell.label(),
                index = progress.index,
                total,
                zoom,
                tile_count = rendered.tile_count,
                cumulative_tiles,
                "Cell exported"
            );
            observer.on_progress(&progress);
        }

        let status = match sink.finish() {
            Ok(pages) => ExportStatus::Completed { pages },
            Err(e) => {
                error!(error = %e, "Failed to save document");
                ExportStatus::Failed {
                    pages: 0,
                    reason: format!("failed to save document: {}", e),
                }
            }
        };
        Ok(self.conclude(status, observer))
    }

    /// Saves the pages produced so far after a mid-job failure.
    fn salvage<S, O>(&self, sink: &mut S, reason: String, observer: &O) -> ExportStatus
    where
        S: PageSink + ?Sized,
        O: ExportObserver + ?Sized,
    {
        warn!(
            reason = %reason,
            pages = sink.page_count(),
            "Export failed, saving completed pages"
        );
        let status = match sink.finish() {
            Ok(pages) => ExportStatus::Failed { pages, reason },
            Err(e) => {
                error!(error = %e, "Failed to save partial document");
                ExportStatus::Failed {
                    pages: 0,
                    reason: format!("{}; saving partial document also failed: {}", reason, e),
                }
            }
        };
        self.conclude(status, observer)
    }

    fn conclude<O>(&self, status: ExportStatus, observer: &O) -> ExportStatus
    where
        O: ExportObserver + ?Sized,
    {
        self.set_state(ExportState::from(&status));
        info!(status = %status, "Export finished");
        observer.on_finished(&status);
        status
    }

    fn set_state(&self, state: ExportState) {
        *self.state.lock() = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GeoBBox;
    use crate::document::{DocumentError, PageInfo, PageOrientation};
    use crate::export::{CallbackObserver, NoopObserver};
    use crate::grid::{Grid, PaperSpec};
    use crate::provider::{Basemap, MockAsyncHttpClient};
    use image::RgbaImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Renders a fixed-size blank raster per cell.
    ///
    /// Fails at `fail_at` (0-based) and trips `cancel_after` once that many
    /// cells have rendered.
    struct FakeRenderer {
        fail_at: Option<usize>,
        cancel_after: Option<(usize, tokio_util::sync::CancellationToken)>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl FakeRenderer {
        fn new() -> Self {
            Self {
                fail_at: None,
                cancel_after: None,
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }
    }

    impl CellRenderer for FakeRenderer {
        async fn render(
            &self,
            _cell: &GridCell,
            zoom: u8,
            _source: &BasemapSource,
            _target_side: u32,
        ) -> Result<RenderedCell, RenderError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_at == Some(call) {
                return Err(RenderError::TaskFailed("boom".into()));
            }
            if let Some((after, token)) = &self.cancel_after {
                if call + 1 == *after {
                    token.cancel();
                }
            }
            Ok(RenderedCell {
                image: RgbaImage::new(30, 20),
                tile_count: 4,
                zoom,
            })
        }
    }

    /// In-memory page sink.
    #[derive(Default)]
    struct MemorySink {
        pages: Vec<(u32, u32)>,
        saved: Option<usize>,
        discarded: bool,
        fail_finish: bool,
    }

    impl PageSink for MemorySink {
        fn add_page(&mut self, image: &RgbaImage) -> Result<PageInfo, DocumentError> {
            let (width, height) = image.dimensions();
            self.pages.push((width, height));
            Ok(PageInfo {
                index: self.pages.len() - 1,
                width,
                height,
                orientation: PageOrientation::of(width, height),
            })
        }

        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn finish(&mut self) -> Result<usize, DocumentError> {
            if self.fail_finish {
                return Err(DocumentError::Pdf("disk full".into()));
            }
            self.saved = Some(self.pages.len());
            Ok(self.pages.len())
        }

        fn discard(&mut self) {
            self.pages.clear();
            self.discarded = true;
        }
    }

    fn five_cells() -> Vec<GridCell> {
        let viewport = GeoBBox::from_corners(135.0, 35.0, 135.5, 35.1).unwrap();
        let grid = Grid::partition(&viewport, 1, 5, PaperSpec::custom());
        assert_eq!(grid.len(), 5);
        grid.into_cells()
    }

    fn job() -> ExportJob {
        ExportJob::new(five_cells(), Basemap::GsiPresent.source())
    }

    #[tokio::test]
    async fn test_completes_all_cells_in_order() {
        let orchestrator = ExportOrchestrator::new(FakeRenderer::new());
        let mut sink = MemorySink::default();
        let progress = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&progress);
        let observer = CallbackObserver::new().with_progress(move |p: &ExportProgress| {
            seen.lock().push(*p);
        });

        let status = orchestrator.run(job(), &mut sink, &observer).await.unwrap();

        assert_eq!(status, ExportStatus::Completed { pages: 5 });
        assert_eq!(sink.saved, Some(5));
        assert_eq!(orchestrator.state(), ExportState::Completed { pages: 5 });

        let progress = progress.lock();
        assert_eq!(progress.len(), 5);
        assert_eq!(progress[0].index, 1);
        assert_eq!(progress[4].index, 5);
        assert_eq!(progress[4].cumulative_tiles, 20);
        assert!((progress[4].fraction - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_cancel_after_two_cells_saves_nothing() {
        let job = job();
        let mut renderer = FakeRenderer::new();
        renderer.cancel_after = Some((2, job.cancellation_token()));
        let orchestrator = ExportOrchestrator::new(renderer);
        let mut sink = MemorySink::default();

        let finished = Arc::new(Mutex::new(None));
        let finished_seen = Arc::clone(&finished);
        let observer = CallbackObserver::new().with_finished(move |s: &ExportStatus| {
            *finished_seen.lock() = Some(s.clone());
        });

        let status = orchestrator.run(job, &mut sink, &observer).await.unwrap();

        assert_eq!(status, ExportStatus::Cancelled);
        assert_eq!(status.pages(), 0);
        assert!(sink.discarded);
        assert_eq!(sink.saved, None);
        assert_eq!(orchestrator.renderer().calls.load(Ordering::SeqCst), 2);
        assert_eq!(*finished.lock(), Some(ExportStatus::Cancelled));
        assert_eq!(orchestrator.state(), ExportState::Cancelled);
    }

    #[tokio::test]
    async fn test_failure_at_fourth_cell_salvages_three_pages() {
        let mut renderer = FakeRenderer::new();
        renderer.fail_at = Some(3);
        let orchestrator = ExportOrchestrator::new(renderer);
        let mut sink = MemorySink::default();

        let status = orchestrator.run(job(), &mut sink, &NoopObserver).await.unwrap();

        match status {
            ExportStatus::Failed { pages, reason } => {
                assert_eq!(pages, 3);
                assert!(reason.contains("r1_c4"), "reason: {}", reason);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(sink.saved, Some(3));
        assert!(!sink.discarded);
    }

    #[tokio::test]
    async fn test_save_failure_reports_zero_pages() {
        let orchestrator = ExportOrchestrator::new(FakeRenderer::new());
        let mut sink = MemorySink {
            fail_finish: true,
            ..Default::default()
        };

        let status = orchestrator.run(job(), &mut sink, &NoopObserver).await.unwrap();
        assert!(matches!(status, ExportStatus::Failed { pages: 0, .. }));
    }

    #[tokio::test]
    async fn test_empty_job_is_config_error() {
        let orchestrator = ExportOrchestrator::new(FakeRenderer::new());
        let mut sink = MemorySink::default();
        let job = ExportJob::new(Vec::new(), Basemap::Esri.source());

        let result = orchestrator.run(job, &mut sink, &NoopObserver).await;
        assert!(matches!(result, Err(ExportError::Config(_))));
        assert_eq!(orchestrator.state(), ExportState::Idle);
        assert_eq!(orchestrator.renderer().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_job_while_running_is_busy() {
        let mut renderer = FakeRenderer::new();
        renderer.delay = Some(Duration::from_millis(20));
        let orchestrator = ExportOrchestrator::new(renderer);
        let mut first_sink = MemorySink::default();
        let mut second_sink = MemorySink::default();

        let (first, second) = tokio::join!(
            orchestrator.run(job(), &mut first_sink, &NoopObserver),
            orchestrator.run(job(), &mut second_sink, &NoopObserver),
        );

        assert_eq!(first.unwrap(), ExportStatus::Completed { pages: 5 });
        assert!(matches!(second, Err(ExportError::Busy)));
        assert!(second_sink.pages.is_empty());
        assert!(!orchestrator.is_running());
    }

    #[tokio::test]
    async fn test_with_mosaic_renders_real_pages() {
        let tile = {
            let img = RgbaImage::from_pixel(256, 256, image::Rgba([0, 0, 255, 255]));
            let mut buffer = Vec::new();
            img.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
                .unwrap();
            buffer
        };
        let orchestrator = ExportOrchestrator::with_mosaic(MockAsyncHttpClient::new(Ok(tile)));
        let viewport = GeoBBox::from_corners(135.0, 35.0, 135.02, 35.01).unwrap();
        let grid = Grid::partition(&viewport, 1, 2, PaperSpec::a4_landscape());
        let job = ExportJob::new(grid.into_cells(), Basemap::GsiPresent.source())
            .with_resolution(crate::zoom::ResolutionMode::Low);
        let mut sink = MemorySink::default();

        let status = orchestrator.run(job, &mut sink, &NoopObserver).await.unwrap();

        assert_eq!(status, ExportStatus::Completed { pages: 2 });
        for (width, height) in &sink.pages {
            assert!(width.max(height) <= &800);
            assert!(*width > *height, "A4 landscape page should be wide");
        }
    }
}
