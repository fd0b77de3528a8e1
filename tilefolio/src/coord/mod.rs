//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (longitude/latitude),
//! spherical Mercator meters and Web Mercator world pixels / tile addresses.
//!
//! All conversions are pure. Latitudes approaching ±90° make the forward
//! projection diverge; callers clamp with [`clamp_latitude`] where needed.

mod types;

pub use types::{
    CoordError, GeoBBox, GeoPoint, PixelBounds, ProjectedPoint, TileAddress, TileRange,
    WorldPixel, EARTH_RADIUS, MAX_LAT, MAX_ZOOM, MIN_LAT, TILE_SIZE,
};

use std::f64::consts::PI;

/// Projects a longitude/latitude pair to spherical Mercator meters.
///
/// `lat` must stay away from the poles; at ±90° the result is infinite.
#[inline]
pub fn to_meters(lng: f64, lat: f64) -> ProjectedPoint {
    let x = lng * PI * EARTH_RADIUS / 180.0;
    let y = EARTH_RADIUS * (PI / 4.0 + lat * PI / 360.0).tan().ln();
    ProjectedPoint { x, y }
}

/// Inverse of [`to_meters`].
#[inline]
pub fn to_lng_lat(x: f64, y: f64) -> GeoPoint {
    let lng = (x / EARTH_RADIUS) * (180.0 / PI);
    let lat = (180.0 / PI) * (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0);
    GeoPoint { lng, lat }
}

/// Converts a position to world pixels at zoom `z` (tile size 256).
#[inline]
pub fn to_world_pixel(lat: f64, lng: f64, z: u8) -> WorldPixel {
    let scale = f64::from(TILE_SIZE) * 2.0_f64.powi(i32::from(z));
    let x = (lng + 180.0) / 360.0 * scale;
    let sin_lat = (lat * PI / 180.0).sin();
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * scale;
    WorldPixel { x, y }
}

/// Clamps a latitude to the projectable Web Mercator range.
#[inline]
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(MIN_LAT, MAX_LAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_to_meters_origin() {
        let p = to_meters(0.0, 0.0);
        assert!(p.x.abs() < EPS);
        assert!(p.y.abs() < EPS);
    }

    #[test]
    fn test_to_meters_antimeridian_is_half_circumference() {
        let p = to_meters(180.0, 0.0);
        assert!((p.x - PI * EARTH_RADIUS).abs() < 1e-3);
    }

    #[test]
    fn test_to_meters_web_mercator_limit_is_square() {
        // At the Web Mercator latitude limit the projected world is square
        let p = to_meters(180.0, MAX_LAT);
        assert!((p.x - p.y).abs() < 1.0, "x={} y={}", p.x, p.y);
    }

    #[test]
    fn test_roundtrip_meters() {
        for (lng, lat) in [(136.03, 35.35), (-74.006, 40.7128), (0.5, -60.0), (179.9, 80.0)] {
            let m = to_meters(lng, lat);
            let back = to_lng_lat(m.x, m.y);
            assert!((back.lng - lng).abs() < 1e-9, "lng {} -> {}", lng, back.lng);
            assert!((back.lat - lat).abs() < 1e-9, "lat {} -> {}", lat, back.lat);
        }
    }

    #[test]
    fn test_to_world_pixel_zoom_zero() {
        let center = to_world_pixel(0.0, 0.0, 0);
        assert!((center.x - 128.0).abs() < EPS);
        assert!((center.y - 128.0).abs() < EPS);

        let west = to_world_pixel(0.0, -180.0, 0);
        assert!(west.x.abs() < EPS);
    }

    #[test]
    fn test_to_world_pixel_scales_with_zoom() {
        let z0 = to_world_pixel(35.0, 136.0, 0);
        let z10 = to_world_pixel(35.0, 136.0, 10);
        assert!((z10.x - z0.x * 1024.0).abs() < 1e-6);
        assert!((z10.y - z0.y * 1024.0).abs() < 1e-6);
    }

    #[test]
    fn test_world_pixel_y_grows_southwards() {
        let north = to_world_pixel(40.0, 0.0, 5);
        let south = to_world_pixel(30.0, 0.0, 5);
        assert!(north.y < south.y);
    }

    #[test]
    fn test_tile_address_range_checked() {
        assert!(TileAddress::new(2, 3, 3).is_ok());
        assert!(matches!(
            TileAddress::new(2, 4, 0),
            Err(CoordError::TileOutOfRange { .. })
        ));
    }

    #[test]
    fn test_tile_range_clamps_to_world() {
        let bounds = PixelBounds {
            min_x: -300.0,
            max_x: 2000.0,
            min_y: -10.0,
            max_y: 100.0,
        };
        let range = TileRange::covering(&bounds, 2);
        assert_eq!((range.min_x, range.max_x), (0, 3));
        assert_eq!((range.min_y, range.max_y), (0, 0));
        assert_eq!(range.count(), 4);
    }

    #[test]
    fn test_tile_range_iterates_row_major() {
        let range = TileRange {
            z: 4,
            min_x: 2,
            max_x: 3,
            min_y: 5,
            max_y: 6,
        };
        let tiles: Vec<_> = range.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(tiles, vec![(2, 5), (3, 5), (2, 6), (3, 6)]);
        assert_eq!(range.world_origin(), (512, 1280));
    }

    #[test]
    fn test_bbox_rejects_inverted_corners() {
        assert!(GeoBBox::from_corners(10.0, 10.0, 5.0, 20.0).is_err());
        assert!(GeoBBox::from_corners(10.0, 10.0, 10.0, 20.0).is_err());
        assert!(GeoBBox::from_corners(f64::NAN, 10.0, 11.0, 20.0).is_err());
    }

    #[test]
    fn test_bbox_parse() {
        let bbox: GeoBBox = "135.9, 35.2,136.2,35.5".parse().unwrap();
        assert_eq!(bbox.min(), GeoPoint::new(135.9, 35.2));
        assert_eq!(bbox.max(), GeoPoint::new(136.2, 35.5));

        assert!("1,2,3".parse::<GeoBBox>().is_err());
        assert!("a,b,c,d".parse::<GeoBBox>().is_err());
    }

    #[test]
    fn test_bbox_pixel_bounds_are_ordered() {
        let bbox = GeoBBox::from_corners(135.9, 35.2, 136.2, 35.5).unwrap();
        let px = bbox.pixel_bounds(12);
        assert!(px.width() > 0.0);
        assert!(px.height() > 0.0);
    }

    #[test]
    fn test_clamp_latitude() {
        assert_eq!(clamp_latitude(89.9), MAX_LAT);
        assert_eq!(clamp_latitude(-89.9), MIN_LAT);
        assert_eq!(clamp_latitude(12.5), 12.5);
    }

    #[test]
    fn test_bbox_clamp_to_mercator() {
        let polar = GeoBBox::from_corners(10.0, 80.0, 12.0, 88.0).unwrap();
        assert!(!polar.is_projectable());
        let clamped = polar.clamp_to_mercator().unwrap();
        assert_eq!(clamped.min(), GeoPoint::new(10.0, 80.0));
        assert_eq!(clamped.max(), GeoPoint::new(12.0, MAX_LAT));
        assert!(clamped.is_projectable());

        let beyond = GeoBBox::from_corners(10.0, 86.0, 12.0, 88.0).unwrap();
        assert!(matches!(
            beyond.clamp_to_mercator(),
            Err(CoordError::InvalidLatitude(lat)) if lat == 86.0
        ));
        let south = GeoBBox::from_corners(10.0, -89.0, 12.0, -86.0).unwrap();
        assert!(south.clamp_to_mercator().is_err());
    }
}
