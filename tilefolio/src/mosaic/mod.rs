//! Tile mosaic rendering.
//!
//! Turns one grid cell into one raster:
//!
//! 1. Compute the cell's pixel footprint at the chosen zoom and the block of
//!    tiles covering it, clamped to the zoom's valid index range.
//! 2. Fetch every tile concurrently and wait for all of them.
//! 3. Stitch the tiles into a mosaic by address, crop to the footprint and
//!    downscale if the longest side is over the page budget.
//!
//! A tile that fails to download or decode is logged and left blank; it
//! never fails the cell.

mod assembly;
mod fetch;

pub use assembly::{crop_to_footprint, fit_to_side, stitch};
pub use fetch::{TileFailure, TileFetchResults, TileSuccess};

use std::time::Duration;

use futures::future::join_all;
use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::coord::{GeoBBox, TileAddress, TileRange};
use crate::provider::{AsyncHttpClient, BasemapSource, ProviderError};

/// Errors that fail a cell render.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The cell's footprint rounds to less than one pixel
    #[error("empty crop {width}x{height} at ({x}, {y})")]
    EmptyCrop {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
    },

    /// The blocking assembly task panicked or was cancelled
    #[error("assembly task failed: {0}")]
    TaskFailed(String),
}

/// The raster for one cell.
#[derive(Debug, Clone)]
pub struct RenderedCell {
    pub image: RgbaImage,
    /// Tiles requested for the cell, failed ones included
    pub tile_count: usize,
    pub zoom: u8,
}

impl RenderedCell {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Renders cells by stitching XYZ tiles fetched over HTTP.
pub struct TileMosaicRenderer<C> {
    client: C,
    tile_timeout: Option<Duration>,
}

impl<C: AsyncHttpClient> TileMosaicRenderer<C> {
    /// Creates a renderer without a per-tile timeout.
    ///
    /// A stalled request then stalls its cell until the client's own
    /// request timeout fires.
    pub fn new(client: C) -> Self {
        Self {
            client,
            tile_timeout: None,
        }
    }

    /// Gives up on any single tile after `timeout`, leaving it blank.
    pub fn with_tile_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tile_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn tile_timeout(&self) -> Option<Duration> {
        self.tile_timeout
    }

    /// Fetches every tile in `range` concurrently.
    ///
    /// Resolves once all requests have settled.
    pub async fn fetch_tiles(&self, range: TileRange, source: &BasemapSource) -> TileFetchResults {
        let fetches = range.iter().map(|tile| async move {
            let outcome = self.fetch_tile(&tile, source).await;
            (tile, outcome)
        });
        let results = TileFetchResults::from_outcomes(range, join_all(fetches).await);

        for failure in &results.failures {
            warn!(tile = %failure.tile, error = %failure.error, "Tile fetch failed, leaving blank");
        }
        results
    }

    async fn fetch_tile(
        &self,
        tile: &TileAddress,
        source: &BasemapSource,
    ) -> Result<Vec<u8>, ProviderError> {
        let url = source.tile_url(tile);
        match self.tile_timeout {
            None => self.client.get(&url).await,
            Some(limit) => match tokio::time::timeout(limit, self.client.get(&url)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ProviderError::Timeout {
                    url,
                    secs: limit.as_secs(),
                }),
            },
        }
    }

    /// Renders `cell` at `zoom`, downscaled so its longest side is at most
    /// `target_side` pixels.
    #[instrument(skip(self, source), fields(cell = %cell))]
    pub async fn render(
        &self,
        cell: &GeoBBox,
        zoom: u8,
        source: &BasemapSource,
        target_side: u32,
    ) -> Result<RenderedCell, RenderError> {
        let footprint = cell.pixel_bounds(zoom);
        let range = TileRange::covering(&footprint, zoom);
        let tile_count = range.count();

        debug!(
            zoom,
            tiles_x = range.tiles_x(),
            tiles_y = range.tiles_y(),
            "Fetching cell tiles"
        );

        let results = self.fetch_tiles(range, source).await;
        let success_count = results.success_count();
        let failure_count = results.failure_count();

        let image = tokio::task::spawn_blocking(move || {
            assembly::compose(results, footprint, target_side)
        })
        .await
        .map_err(|e| RenderError::TaskFailed(e.to_string()))??;

        info!(
            zoom,
            tile_count,
            success_count,
            failure_count,
            width = image.width(),
            height = image.height(),
            "Cell rendered"
        );

        Ok(RenderedCell {
            image,
            tile_count,
            zoom,
        })
    }
}
