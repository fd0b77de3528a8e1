//! Coordinate type definitions

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Spherical Mercator earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Edge length of one web-map tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Highest zoom level any registered basemap can be asked for.
pub const MAX_ZOOM: u8 = 24;

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside the projectable range
    #[error("Invalid latitude: {0} (must be between {min} and {max})", min = MIN_LAT, max = MAX_LAT)]
    InvalidLatitude(f64),

    /// Zoom level above [`MAX_ZOOM`]
    #[error("Invalid zoom level: {0} (must be between 0 and {max})", max = MAX_ZOOM)]
    InvalidZoom(u8),

    /// Tile index outside 0..2^z
    #[error("Tile ({x}, {y}) out of range at zoom {z}")]
    TileOutOfRange { z: u8, x: u32, y: u32 },

    /// Corners that do not form a non-empty rectangle
    #[error("Invalid bounding box: {0}")]
    InvalidBBox(String),
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lng, self.lat)
    }
}

/// A position in spherical Mercator meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position in world pixels at some integer zoom (scale = 256·2^z).
///
/// `y` grows southwards, as in the tile scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPixel {
    pub x: f64,
    pub y: f64,
}

/// A geographic rectangle with `min` strictly south-west of `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBBox {
    min: GeoPoint,
    max: GeoPoint,
}

impl GeoBBox {
    /// Creates a bounding box, rejecting non-finite or inverted corners.
    pub fn new(min: GeoPoint, max: GeoPoint) -> Result<Self, CoordError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(CoordError::InvalidBBox(format!(
                "non-finite corner {} / {}",
                min, max
            )));
        }
        if min.lng >= max.lng || min.lat >= max.lat {
            return Err(CoordError::InvalidBBox(format!(
                "min {} must be south-west of max {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Creates a bounding box from `min_lng, min_lat, max_lng, max_lat`.
    pub fn from_corners(
        min_lng: f64,
        min_lat: f64,
        max_lng: f64,
        max_lat: f64,
    ) -> Result<Self, CoordError> {
        Self::new(GeoPoint::new(min_lng, min_lat), GeoPoint::new(max_lng, max_lat))
    }

    /// Builds a box from corners already known to be ordered.
    ///
    /// Used by the grid lattice, whose corners come out of the inverse
    /// projection of strictly increasing meter offsets.
    pub(crate) fn from_ordered(min: GeoPoint, max: GeoPoint) -> Self {
        debug_assert!(min.lng <= max.lng && min.lat <= max.lat);
        Self { min, max }
    }

    /// Clamps both latitudes into the Web Mercator range.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::InvalidLatitude`] when nothing of the box is
    /// left after clamping (it lies wholly beyond ±[`MAX_LAT`]).
    pub fn clamp_to_mercator(&self) -> Result<Self, CoordError> {
        let min_lat = super::clamp_latitude(self.min.lat);
        let max_lat = super::clamp_latitude(self.max.lat);
        if min_lat >= max_lat {
            let outside = if self.min.lat >= MAX_LAT { self.min.lat } else { self.max.lat };
            return Err(CoordError::InvalidLatitude(outside));
        }
        Ok(Self {
            min: GeoPoint::new(self.min.lng, min_lat),
            max: GeoPoint::new(self.max.lng, max_lat),
        })
    }

    /// Whether both latitudes lie inside the Web Mercator range.
    ///
    /// Allows for the rounding of a projection round trip at the limit.
    pub fn is_projectable(&self) -> bool {
        const SLACK: f64 = 1e-9;
        self.min.lat >= MIN_LAT - SLACK && self.max.lat <= MAX_LAT + SLACK
    }

    pub fn min(&self) -> GeoPoint {
        self.min
    }

    pub fn max(&self) -> GeoPoint {
        self.max
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min.lng + self.max.lng) / 2.0,
            (self.min.lat + self.max.lat) / 2.0,
        )
    }

    /// Whether `point` lies inside the box, edges included.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lng >= self.min.lng
            && point.lng <= self.max.lng
            && point.lat >= self.min.lat
            && point.lat <= self.max.lat
    }

    /// Pixel footprint of this box at zoom `z`.
    pub fn pixel_bounds(&self, z: u8) -> PixelBounds {
        let sw = super::to_world_pixel(self.min.lat, self.min.lng, z);
        let ne = super::to_world_pixel(self.max.lat, self.max.lng, z);
        PixelBounds {
            min_x: sw.x.min(ne.x),
            max_x: sw.x.max(ne.x),
            min_y: sw.y.min(ne.y),
            max_y: sw.y.max(ne.y),
        }
    }
}

impl fmt::Display for GeoBBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6},{:.6},{:.6},{:.6}",
            self.min.lng, self.min.lat, self.max.lng, self.max.lat
        )
    }
}

impl FromStr for GeoBBox {
    type Err = CoordError;

    /// Parses `min_lng,min_lat,max_lng,max_lat`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoordError::InvalidBBox(format!("'{}': {}", s, e)))?;

        match values.as_slice() {
            [min_lng, min_lat, max_lng, max_lat] => {
                Self::from_corners(*min_lng, *min_lat, *max_lng, *max_lat)
            }
            _ => Err(CoordError::InvalidBBox(format!(
                "'{}': expected min_lng,min_lat,max_lng,max_lat",
                s
            ))),
        }
    }
}

/// World-pixel rectangle covered by a bounding box at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl PixelBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Address of one web-map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileAddress {
    /// Zoom level
    pub z: u8,
    /// Column, 0 at the antimeridian, growing east
    pub x: u32,
    /// Row, 0 at the north edge, growing south
    pub y: u32,
}

impl TileAddress {
    /// Creates a tile address, checking `x` and `y` against `2^z`.
    pub fn new(z: u8, x: u32, y: u32) -> Result<Self, CoordError> {
        if z > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(z));
        }
        let n = 1u64 << z;
        if u64::from(x) >= n || u64::from(y) >= n {
            return Err(CoordError::TileOutOfRange { z, x, y });
        }
        Ok(Self { z, x, y })
    }

    /// World pixel of this tile's top-left corner.
    pub fn world_origin(&self) -> (u64, u64) {
        (
            u64::from(self.x) * u64::from(TILE_SIZE),
            u64::from(self.y) * u64::from(TILE_SIZE),
        )
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Inclusive block of tiles covering a pixel footprint, clamped to the
/// valid index range of its zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub z: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Tiles touched by `bounds` at zoom `z`, each axis clamped to `[0, 2^z - 1]`.
    pub fn covering(bounds: &PixelBounds, z: u8) -> Self {
        let max_index = ((1u64 << z.min(MAX_ZOOM)) - 1) as f64;
        let tile = f64::from(TILE_SIZE);
        let index = |px: f64| (px / tile).floor().clamp(0.0, max_index) as u32;

        Self {
            z,
            min_x: index(bounds.min_x),
            max_x: index(bounds.max_x),
            min_y: index(bounds.min_y),
            max_y: index(bounds.max_y),
        }
    }

    pub fn tiles_x(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn tiles_y(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn count(&self) -> usize {
        self.tiles_x() as usize * self.tiles_y() as usize
    }

    /// World pixel of the range's top-left corner.
    pub fn world_origin(&self) -> (u64, u64) {
        TileAddress {
            z: self.z,
            x: self.min_x,
            y: self.min_y,
        }
        .world_origin()
    }

    /// Iterates the addresses in row-major order (north row first).
    pub fn iter(&self) -> impl Iterator<Item = TileAddress> + '_ {
        (self.min_y..=self.max_y).flat_map(move |y| {
            (self.min_x..=self.max_x).map(move |x| TileAddress { z: self.z, x, y })
        })
    }
}
