//! Human-scale dimensions of a grid.

use std::f64::consts::PI;
use std::fmt;

use crate::coord::{GeoBBox, EARTH_RADIUS};

/// Approximate ground size of a grid and of one of its cells.
///
/// Distances use a flat metres-per-degree approximation at the grid's
/// centre latitude, which is plenty for labelling a print layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSummary {
    pub width_km: f64,
    pub height_km: f64,
    pub cell_width_km: f64,
    pub cell_height_km: f64,
    /// Cell width/height on the ground; `None` for a zero-height cell
    pub cell_aspect: Option<f64>,
}

impl GridSummary {
    pub(crate) fn from_bounds(bounds: &GeoBBox, rows: u32, cols: u32) -> Self {
        let center_lat = bounds.center().lat;
        let meters_per_deg_lat = 2.0 * PI * EARTH_RADIUS / 360.0;
        let meters_per_deg_lng = meters_per_deg_lat * (center_lat * PI / 180.0).cos();

        let width_km = (bounds.max().lng - bounds.min().lng) * meters_per_deg_lng / 1000.0;
        let height_km = (bounds.max().lat - bounds.min().lat) * meters_per_deg_lat / 1000.0;
        let cell_width_km = width_km / f64::from(cols.max(1));
        let cell_height_km = height_km / f64::from(rows.max(1));

        let cell_aspect = (cell_height_km != 0.0)
            .then(|| cell_width_km / cell_height_km)
            .filter(|aspect| aspect.is_finite());

        Self {
            width_km,
            height_km,
            cell_width_km,
            cell_height_km,
            cell_aspect,
        }
    }
}

impl fmt::Display for GridSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grid ≈ {:.3} × {:.3} km; cell ≈ {:.3} × {:.3} km (aspect ",
            self.width_km, self.height_km, self.cell_width_km, self.cell_height_km
        )?;
        match self.cell_aspect {
            Some(aspect) => write!(f, "{:.3})", aspect),
            None => write!(f, "–)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_at_equator() {
        let bounds = GeoBBox::from_corners(0.0, -0.5, 1.0, 0.5).unwrap();
        let summary = GridSummary::from_bounds(&bounds, 1, 2);

        // 2πR / 360 ≈ 111.32 km
        assert!((summary.width_km - 111.319).abs() < 0.01);
        assert!((summary.height_km - 111.319).abs() < 0.01);
        assert!((summary.cell_width_km - 55.66).abs() < 0.01);
        assert!((summary.cell_aspect.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        let bounds = GeoBBox::from_corners(0.0, 59.5, 1.0, 60.5).unwrap();
        let summary = GridSummary::from_bounds(&bounds, 1, 1);
        assert!((summary.width_km - summary.height_km / 2.0).abs() < 0.05);
    }

    #[test]
    fn test_display() {
        let bounds = GeoBBox::from_corners(0.0, -0.5, 1.0, 0.5).unwrap();
        let text = GridSummary::from_bounds(&bounds, 1, 1).to_string();
        assert!(text.starts_with("grid ≈ 111.319 × 111.319 km"));
        assert!(text.ends_with("(aspect 1.000)"));
    }
}
