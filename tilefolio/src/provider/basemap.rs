//! Basemap registry.
//!
//! The supported tile sources are fixed at build time, so the registry is a
//! closed enum backed by a static table rather than a runtime map.
//!
//! # URL templates
//!
//! Templates use `{z}`, `{x}` and `{y}` placeholders substituted with decimal
//! integers. Providers disagree on the path order (Esri serves
//! `.../tile/{z}/{y}/{x}`, GSI `{z}/{x}/{y}.jpg`, Google puts them in the
//! query string); the template hides that difference.
//!
//! # Zoom limits
//!
//! `max_native_zoom` is the deepest level with real imagery. Requests above
//! it are upsampled by the provider or fail, which is why zoom selection
//! never goes more than two levels past it.

use std::fmt;
use std::str::FromStr;

use super::ProviderError;
use crate::coord::TileAddress;

/// A tile source: URL template plus zoom limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasemapSource {
    /// Display name for logs and listings
    pub name: String,
    pub url_template: String,
    pub max_zoom: u8,
    pub max_native_zoom: u8,
}

impl BasemapSource {
    /// Creates a source from an arbitrary template.
    ///
    /// The template is not checked here; [`BasemapSource::validate`] runs
    /// before an export starts.
    pub fn custom(url_template: impl Into<String>, max_native_zoom: u8) -> Self {
        Self {
            name: "custom".to_string(),
            url_template: url_template.into(),
            max_zoom: max_native_zoom.max(22),
            max_native_zoom,
        }
    }

    /// Checks that the template can address tiles.
    pub fn validate(&self) -> Result<(), ProviderError> {
        let template = self.url_template.trim();
        let usable = !template.is_empty()
            && ["{z}", "{x}", "{y}"]
                .iter()
                .all(|placeholder| template.contains(placeholder));

        if usable {
            Ok(())
        } else {
            Err(ProviderError::InvalidTemplate(self.url_template.clone()))
        }
    }

    /// Substitutes a tile address into the template.
    pub fn tile_url(&self, tile: &TileAddress) -> String {
        self.url_template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

/// The built-in basemaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Basemap {
    /// Esri World Imagery
    #[default]
    Esri,
    /// GSI aerial photographs, 1974-1978
    Gsi1974,
    /// GSI seamless current photographs
    GsiPresent,
    /// GSI aerial photographs, 1961-1969
    Gsi1961,
    /// GSI aerial photographs, 1979-1983
    Gsi1984,
    /// Google satellite
    GoogleSat,
    /// Google satellite with labels
    GoogleHybrid,
    /// Google road map
    GoogleMaps,
}

struct BasemapEntry {
    key: &'static str,
    name: &'static str,
    template: &'static str,
    max_zoom: u8,
    max_native_zoom: u8,
}

const ESRI: BasemapEntry = BasemapEntry {
    key: "esri",
    name: "Esri World Imagery",
    template:
        "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
    max_zoom: 22,
    max_native_zoom: 19,
};

const GSI_1974: BasemapEntry = BasemapEntry {
    key: "gsi1974",
    name: "GSI aerial photos 1974-1978",
    template: "https://cyberjapandata.gsi.go.jp/xyz/gazo1/{z}/{x}/{y}.jpg",
    max_zoom: 22,
    max_native_zoom: 18,
};

const GSI_PRESENT: BasemapEntry = BasemapEntry {
    key: "gsi-present",
    name: "GSI seamless photos (current)",
    template: "https://cyberjapandata.gsi.go.jp/xyz/seamlessphoto/{z}/{x}/{y}.jpg",
    max_zoom: 22,
    max_native_zoom: 18,
};

const GSI_1961: BasemapEntry = BasemapEntry {
    key: "gsi1961",
    name: "GSI aerial photos 1961-1969",
    template: "https://cyberjapandata.gsi.go.jp/xyz/ort_old10/{z}/{x}/{y}.png",
    max_zoom: 22,
    max_native_zoom: 18,
};

const GSI_1984: BasemapEntry = BasemapEntry {
    key: "gsi1984",
    name: "GSI aerial photos 1979-1983",
    template: "https://cyberjapandata.gsi.go.jp/xyz/gazo3/{z}/{x}/{y}.jpg",
    max_zoom: 22,
    max_native_zoom: 18,
};

const GOOGLE_SAT: BasemapEntry = BasemapEntry {
    key: "google-sat",
    name: "Google satellite",
    template: "https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}",
    max_zoom: 22,
    max_native_zoom: 21,
};

const GOOGLE_HYBRID: BasemapEntry = BasemapEntry {
    key: "google-hybrid",
    name: "Google hybrid",
    template: "https://mt1.google.com/vt/lyrs=y&x={x}&y={y}&z={z}",
    max_zoom: 22,
    max_native_zoom: 21,
};

const GOOGLE_MAPS: BasemapEntry = BasemapEntry {
    key: "google-maps",
    name: "Google road map",
    template: "https://mt1.google.com/vt/lyrs=m&x={x}&y={y}&z={z}",
    max_zoom: 22,
    max_native_zoom: 21,
};

impl Basemap {
    /// Every registered basemap, in listing order.
    pub const ALL: [Basemap; 8] = [
        Basemap::Esri,
        Basemap::Gsi1974,
        Basemap::GsiPresent,
        Basemap::Gsi1961,
        Basemap::Gsi1984,
        Basemap::GoogleSat,
        Basemap::GoogleHybrid,
        Basemap::GoogleMaps,
    ];

    fn entry(&self) -> &'static BasemapEntry {
        match self {
            Basemap::Esri => &ESRI,
            Basemap::Gsi1974 => &GSI_1974,
            Basemap::GsiPresent => &GSI_PRESENT,
            Basemap::Gsi1961 => &GSI_1961,
            Basemap::Gsi1984 => &GSI_1984,
            Basemap::GoogleSat => &GOOGLE_SAT,
            Basemap::GoogleHybrid => &GOOGLE_HYBRID,
            Basemap::GoogleMaps => &GOOGLE_MAPS,
        }
    }

    /// Registry key used on the command line and in config files.
    pub fn key(&self) -> &'static str {
        self.entry().key
    }

    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    pub fn max_native_zoom(&self) -> u8 {
        self.entry().max_native_zoom
    }

    /// Builds the tile source for this basemap.
    pub fn source(&self) -> BasemapSource {
        let entry = self.entry();
        BasemapSource {
            name: entry.name.to_string(),
            url_template: entry.template.to_string(),
            max_zoom: entry.max_zoom,
            max_native_zoom: entry.max_native_zoom,
        }
    }
}

impl fmt::Display for Basemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Basemap {
    type Err = ProviderError;

    /// Accepts the registry key case-insensitively, with or without dashes
    /// (`gsi-present`, `gsiPresent` and `gsipresent` are the same basemap).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        Basemap::ALL
            .into_iter()
            .find(|basemap| basemap.key().replace('-', "") == wanted)
            .ok_or_else(|| ProviderError::UnknownBasemap(s.to_string()))
    }
}
