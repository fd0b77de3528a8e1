//! Zoom level selection.
//!
//! Every page gets a pixel budget for its longest side ([`base_size`]) and
//! the tile zoom is chosen so the cell's footprint at that zoom is roughly
//! that many pixels ([`auto_zoom`]). Users may ask for a finer zoom, but
//! [`resolve_zoom`] never goes more than two levels past either the
//! automatic choice or the basemap's native imagery.
//!
//! # Pixel budget
//!
//! Up to four pages get the nominal size of their [`ResolutionMode`]. Larger
//! grids share a budget of 100 megapixels, so each page side is capped at
//! `sqrt(1e8 / cells)`, never exceeding 14000 px and never dropping below
//! 800 px.

mod resolution;

pub use resolution::ResolutionMode;

use tracing::trace;

use crate::coord::{GeoBBox, TileRange};
use crate::grid::Grid;
use crate::provider::BasemapSource;

/// Pixel budget shared by all pages of a large grid.
pub const MAX_TOTAL_PIXELS: f64 = 100_000_000.0;

/// Hard cap on a page's longest side.
pub const MAX_PAGE_SIDE: u32 = 14_000;

/// Lower bound on the budget for grids of more than four cells.
pub const MIN_BASE_SIZE: u32 = 800;

/// Zoom used when a cell's footprint cannot be measured.
pub const FALLBACK_ZOOM: u8 = 18;

/// How far past the automatic or native zoom an override may reach.
pub const MAX_ZOOM_BUMP: u8 = 2;

/// Highest zoom offered in the zoom picker.
pub const MAX_OFFERED_ZOOM: u8 = 22;

/// Target length in pixels of a page's longest side.
pub fn base_size(mode: ResolutionMode, cell_count: usize) -> u32 {
    let nominal = mode.nominal_size();
    if cell_count <= 4 {
        return nominal;
    }

    let per_page_side = (MAX_TOTAL_PIXELS / cell_count as f64)
        .sqrt()
        .min(f64::from(MAX_PAGE_SIDE));
    let size = f64::from(nominal).min(per_page_side).round() as u32;
    size.max(MIN_BASE_SIZE)
}

/// Zoom at which the cell's longest side is about [`base_size`] pixels.
///
/// Clamped to `[0, max_native_zoom + 2]`. A cell whose footprint is zero or
/// not finite gets [`FALLBACK_ZOOM`], under the same clamp.
pub fn auto_zoom(
    cell: &GeoBBox,
    source: &BasemapSource,
    mode: ResolutionMode,
    cell_count: usize,
) -> u8 {
    let max_allowed = source.max_native_zoom.saturating_add(MAX_ZOOM_BUMP);
    let footprint = cell.pixel_bounds(0);
    let longest0 = footprint.width().abs().max(footprint.height().abs());
    if !longest0.is_finite() || longest0 <= 0.0 {
        return FALLBACK_ZOOM.min(max_allowed);
    }

    let base = f64::from(base_size(mode, cell_count));
    let mut z = (base / longest0).log2();
    if !z.is_finite() {
        z = f64::from(FALLBACK_ZOOM);
    }

    z.round().clamp(0.0, f64::from(max_allowed)) as u8
}

/// Final zoom for a cell, honouring an optional user override.
///
/// The override is clamped to `[0, min(auto + 2, max_native_zoom + 2)]`.
pub fn resolve_zoom(
    cell: &GeoBBox,
    source: &BasemapSource,
    override_zoom: Option<i32>,
    mode: ResolutionMode,
    cell_count: usize,
) -> u8 {
    let auto = auto_zoom(cell, source, mode, cell_count);
    let Some(requested) = override_zoom else {
        return auto;
    };

    let ceiling = auto
        .saturating_add(MAX_ZOOM_BUMP)
        .min(source.max_native_zoom.saturating_add(MAX_ZOOM_BUMP));
    let zoom = requested.clamp(0, i32::from(ceiling)) as u8;

    trace!(requested, auto, ceiling, zoom, "Resolved zoom override");
    zoom
}

/// Number of tiles needed to cover `bbox` at zoom `z`.
pub fn estimate_tile_count(bbox: &GeoBBox, z: u8) -> usize {
    TileRange::covering(&bbox.pixel_bounds(z), z).count()
}

/// One entry of the zoom picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomOption {
    /// `auto`, `+1` or `+2`
    pub label: &'static str,
    pub zoom: u8,
    /// Tiles the whole grid would fetch at this zoom
    pub estimated_tiles: usize,
}

/// Zoom choices for a grid: the automatic zoom of its first cell plus up to
/// two finer levels, capped at `min(22, max_native_zoom + 2)`.
///
/// Empty for an empty grid.
pub fn zoom_options(grid: &Grid, source: &BasemapSource, mode: ResolutionMode) -> Vec<ZoomOption> {
    let Some(first) = grid.cells().first() else {
        return Vec::new();
    };

    let max_allowed = MAX_OFFERED_ZOOM.min(source.max_native_zoom.saturating_add(MAX_ZOOM_BUMP));
    let auto = auto_zoom(&first.bbox, source, mode, grid.len());

    [("auto", 0u8), ("+1", 1), ("+2", 2)]
        .into_iter()
        .filter(|(_, bump)| *bump == 0 || auto.saturating_add(*bump) <= max_allowed)
        .map(|(label, bump)| {
            let zoom = auto.saturating_add(bump);
            let estimated_tiles = grid
                .cells()
                .iter()
                .map(|cell| estimate_tile_count(&cell.bbox, zoom))
                .sum();
            ZoomOption {
                label,
                zoom,
                estimated_tiles,
            }
        })
        .collect()
}
