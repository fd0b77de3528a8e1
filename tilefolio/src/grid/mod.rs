//! Paper-aware grid partitioning
//!
//! Splits a viewport into `rows × cols` rectangular cells. The lattice is
//! laid out in spherical Mercator meters, so cells that look identical on a
//! web map also come out identical on paper, and converted back to
//! longitude/latitude at the end.
//!
//! # Example
//!
//! ```ignore
//! use tilefolio::coord::GeoBBox;
//! use tilefolio::grid::{Grid, PaperSpec};
//!
//! let viewport = GeoBBox::from_corners(135.9, 35.2, 136.2, 35.5)?;
//! let grid = Grid::partition(&viewport, 2, 3, PaperSpec::a4_landscape());
//! assert_eq!(grid.len(), 6);
//! println!("{}", grid.summary().unwrap());
//! ```

mod paper;
mod summary;

pub use paper::{Orientation, PaperMode, PaperSpec};
pub use summary::GridSummary;

use tracing::{debug, warn};

use crate::coord::{to_lng_lat, to_meters, GeoBBox, GeoPoint, ProjectedPoint};

/// One cell of the export grid; becomes one page of the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// 0-based row, counted from the southern edge
    pub row: u32,
    /// 0-based column, counted from the western edge
    pub col: u32,
    pub bbox: GeoBBox,
}

impl GridCell {
    /// Human-readable label, e.g. `r1_c2` for row 0 column 1.
    pub fn label(&self) -> String {
        format!("r{}_c{}", self.row + 1, self.col + 1)
    }
}

/// An ordered (row-major) set of cells covering one rectangle.
///
/// A grid is only ever replaced as a whole: regeneration builds a new one
/// and dragging returns a translated copy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    rows: u32,
    cols: u32,
    cells: Vec<GridCell>,
}

impl Grid {
    /// Partitions `viewport` into `rows × cols` cells shaped by `paper`.
    ///
    /// For A3/A4 every cell gets the paper's exact aspect ratio: the cell
    /// height is the largest that fits both dimensions, and the resulting
    /// grid is centred on the viewport (it may be smaller than it). Custom
    /// paper divides the viewport directly.
    ///
    /// Zero rows/cols or a viewport with no projected area yield an empty
    /// grid.
    pub fn partition(viewport: &GeoBBox, rows: u32, cols: u32, paper: PaperSpec) -> Self {
        if rows == 0 || cols == 0 {
            warn!(rows, cols, "Grid needs at least one row and one column");
            return Self::empty(rows, cols);
        }

        let sw = to_meters(viewport.min().lng, viewport.min().lat);
        let ne = to_meters(viewport.max().lng, viewport.max().lat);
        let view_width = ne.x - sw.x;
        let view_height = ne.y - sw.y;

        if !(view_width.is_finite() && view_height.is_finite())
            || view_width <= 0.0
            || view_height <= 0.0
        {
            warn!(
                view_width,
                view_height, "Viewport has no projected area, grid left empty"
            );
            return Self::empty(rows, cols);
        }

        let rows_f = f64::from(rows);
        let cols_f = f64::from(cols);

        let (origin, cell_width, cell_height) = match paper.target_aspect() {
            Some(aspect) => {
                let cell_height = (view_height / rows_f).min(view_width / (cols_f * aspect));
                let cell_width = cell_height * aspect;

                let center_x = (sw.x + ne.x) / 2.0;
                let center_y = (sw.y + ne.y) / 2.0;
                let origin = ProjectedPoint::new(
                    center_x - cell_width * cols_f / 2.0,
                    center_y - cell_height * rows_f / 2.0,
                );
                (origin, cell_width, cell_height)
            }
            None => (sw, view_width / cols_f, view_height / rows_f),
        };

        debug!(
            rows,
            cols,
            paper = %paper,
            cell_width_m = cell_width,
            cell_height_m = cell_height,
            "Partitioning viewport"
        );

        Self::lattice(origin, cell_width, cell_height, rows, cols)
    }

    /// Rebuilds a grid whose overall extent is exactly `extent`.
    ///
    /// No paper fitting is applied; this restores a previously saved grid
    /// from its outer bounds.
    pub fn from_extent(extent: &GeoBBox, rows: u32, cols: u32) -> Self {
        Self::partition(extent, rows, cols, PaperSpec::custom())
    }

    fn lattice(
        origin: ProjectedPoint,
        cell_width: f64,
        cell_height: f64,
        rows: u32,
        cols: u32,
    ) -> Self {
        let mut cells = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                let min_x = origin.x + f64::from(col) * cell_width;
                let min_y = origin.y + f64::from(row) * cell_height;
                let sw = to_lng_lat(min_x, min_y);
                let ne = to_lng_lat(min_x + cell_width, min_y + cell_height);
                cells.push(GridCell {
                    row,
                    col,
                    bbox: GeoBBox::from_ordered(sw, ne),
                });
            }
        }
        Self { rows, cols, cells }
    }

    fn empty(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            cells: Vec::new(),
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<GridCell> {
        self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns a copy shifted by `(dx, dy)` projected meters.
    ///
    /// Every cell moves by the same delta and keeps its row/col.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        let cells = self
            .cells
            .iter()
            .map(|cell| {
                let min = to_meters(cell.bbox.min().lng, cell.bbox.min().lat);
                let max = to_meters(cell.bbox.max().lng, cell.bbox.max().lat);
                GridCell {
                    row: cell.row,
                    col: cell.col,
                    bbox: GeoBBox::from_ordered(
                        to_lng_lat(min.x + dx, min.y + dy),
                        to_lng_lat(max.x + dx, max.y + dy),
                    ),
                }
            })
            .collect();

        Self {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    /// Drags the grid so that the point under `from` ends up under `to`.
    pub fn drag(&self, from: GeoPoint, to: GeoPoint) -> Self {
        let start = to_meters(from.lng, from.lat);
        let end = to_meters(to.lng, to.lat);
        self.translate(end.x - start.x, end.y - start.y)
    }

    /// Whether `point` falls inside any cell.
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.cells.iter().any(|cell| cell.bbox.contains(point))
    }

    /// Overall longitude/latitude extent of the cells.
    pub fn bounds(&self) -> Option<GeoBBox> {
        let first = self.cells.first()?;
        let (mut min, mut max) = (first.bbox.min(), first.bbox.max());
        for cell in &self.cells[1..] {
            min.lng = min.lng.min(cell.bbox.min().lng);
            min.lat = min.lat.min(cell.bbox.min().lat);
            max.lng = max.lng.max(cell.bbox.max().lng);
            max.lat = max.lat.max(cell.bbox.max().lat);
        }
        GeoBBox::new(min, max).ok()
    }

    /// Size of the grid and its cells in kilometres.
    pub fn summary(&self) -> Option<GridSummary> {
        let bounds = self.bounds()?;
        Some(GridSummary::from_bounds(&bounds, self.rows, self.cols))
    }
}
