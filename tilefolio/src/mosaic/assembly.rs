//! Mosaic assembly: stitch tiles, crop to the cell, fit to the page budget.
//!
//! Everything here is synchronous and CPU-bound; the renderer runs it on the
//! blocking pool.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{debug, warn};

use super::fetch::TileFetchResults;
use super::RenderError;
use crate::coord::{PixelBounds, TileRange, TILE_SIZE};

/// Below this downscale is skipped; the difference would not be visible.
const MIN_SCALE_CHANGE: f64 = 0.999;

/// Runs stitch, crop and fit in sequence.
pub(crate) fn compose(
    results: TileFetchResults,
    footprint: PixelBounds,
    target_side: u32,
) -> Result<RgbaImage, RenderError> {
    let mosaic = stitch(&results);
    let cropped = crop_to_footprint(&mosaic, results.range(), &footprint)?;
    Ok(fit_to_side(cropped, target_side))
}

/// Places every fetched tile on a `(tiles_x * 256) x (tiles_y * 256)` canvas.
///
/// Missing or undecodable tiles leave their slot transparent.
pub fn stitch(results: &TileFetchResults) -> RgbaImage {
    let range = results.range();
    let mut canvas = RgbaImage::new(range.tiles_x() * TILE_SIZE, range.tiles_y() * TILE_SIZE);

    for success in &results.successes {
        let tile = success.tile;
        let inside = (range.min_x..=range.max_x).contains(&tile.x)
            && (range.min_y..=range.max_y).contains(&tile.y);
        if !inside {
            warn!(tile = %tile, "Tile outside the cell's range, skipping");
            continue;
        }

        match decode_tile(&success.data) {
            Ok(image) => {
                let x_offset = (tile.x - range.min_x) * TILE_SIZE;
                let y_offset = (tile.y - range.min_y) * TILE_SIZE;
                place_tile(&mut canvas, &image, x_offset, y_offset);
            }
            Err(e) => {
                warn!(tile = %tile, error = %e, "Failed to decode tile, leaving blank");
            }
        }
    }

    canvas
}

fn decode_tile(data: &[u8]) -> Result<RgbaImage, String> {
    let image = image::load_from_memory(data).map_err(|e| format!("image decode error: {}", e))?;
    Ok(image.to_rgba8())
}

/// Copies a tile into its slot, clipping anything past 256 px.
fn place_tile(canvas: &mut RgbaImage, tile: &RgbaImage, x_offset: u32, y_offset: u32) {
    let width = tile.width().min(TILE_SIZE);
    let height = tile.height().min(TILE_SIZE);
    if width == tile.width() && height == tile.height() {
        imageops::replace(canvas, tile, i64::from(x_offset), i64::from(y_offset));
    } else {
        let clipped = imageops::crop_imm(tile, 0, 0, width, height).to_image();
        imageops::replace(canvas, &clipped, i64::from(x_offset), i64::from(y_offset));
    }
}

/// Cuts the cell's exact pixel footprint out of the mosaic.
///
/// Offsets and size are rounded to whole pixels. The result is always
/// `crop_w x crop_h`; any part of the footprint past the mosaic edge (the
/// tile range was clamped at the edge of the world) stays transparent.
pub fn crop_to_footprint(
    mosaic: &RgbaImage,
    range: &TileRange,
    footprint: &PixelBounds,
) -> Result<RgbaImage, RenderError> {
    let (origin_x, origin_y) = range.world_origin();
    let crop_x = (footprint.min_x - origin_x as f64).round() as i64;
    let crop_y = (footprint.min_y - origin_y as f64).round() as i64;
    let crop_w = footprint.width().round() as i64;
    let crop_h = footprint.height().round() as i64;

    if crop_w <= 0 || crop_h <= 0 || crop_w > i64::from(u32::MAX) || crop_h > i64::from(u32::MAX)
    {
        return Err(RenderError::EmptyCrop {
            x: crop_x,
            y: crop_y,
            width: crop_w,
            height: crop_h,
        });
    }

    let x0 = crop_x.max(0);
    let y0 = crop_y.max(0);
    let x1 = (crop_x + crop_w).min(i64::from(mosaic.width()));
    let y1 = (crop_y + crop_h).min(i64::from(mosaic.height()));

    let inside = (x0, y0, x1 - x0, y1 - y0) == (crop_x, crop_y, crop_w, crop_h);
    if inside {
        let (x, y) = (crop_x as u32, crop_y as u32);
        return Ok(imageops::crop_imm(mosaic, x, y, crop_w as u32, crop_h as u32).to_image());
    }

    debug!(crop_x, crop_y, crop_w, crop_h, "Footprint overhangs mosaic, padding with blank");
    let mut canvas = RgbaImage::new(crop_w as u32, crop_h as u32);
    if x1 > x0 && y1 > y0 {
        let overlap =
            imageops::crop_imm(mosaic, x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
                .to_image();
        imageops::replace(&mut canvas, &overlap, x0 - crop_x, y0 - crop_y);
    }
    Ok(canvas)
}

/// Downscales so the longest side is at most `target_side`.
///
/// Images already within budget, or within 0.1% of it, are returned as is.
pub fn fit_to_side(image: RgbaImage, target_side: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= target_side || target_side == 0 {
        return image;
    }

    let scale = f64::from(target_side) / f64::from(longest);
    if scale >= MIN_SCALE_CHANGE {
        return image;
    }

    let target_w = ((f64::from(width) * scale).round() as u32).max(1);
    let target_h = ((f64::from(height) * scale).round() as u32).max(1);
    debug!(width, height, target_w, target_h, "Downscaling cell raster");

    imageops::resize(&image, target_w, target_h, FilterType::Triangle)
}
