//! Argument types and resolution helpers shared by `plan` and `export`.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::style;
use tilefolio::config::{config_file_path, ConfigFile};
use tilefolio::coord::{GeoBBox, MAX_LAT};
use tilefolio::grid::{Grid, Orientation, PaperMode, PaperSpec};
use tilefolio::provider::{Basemap, BasemapSource};
use tilefolio::zoom::{ResolutionMode, FALLBACK_ZOOM};

use crate::error::CliError;

/// Native zoom assumed for a custom template without `--max-native-zoom`.
pub const DEFAULT_CUSTOM_NATIVE_ZOOM: u8 = FALLBACK_ZOOM;

/// Basemap selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum BasemapChoice {
    /// Esri World Imagery
    Esri,
    /// GSI aerial photos 1974-1978
    Gsi1974,
    /// GSI seamless aerial photos (current)
    GsiPresent,
    /// GSI aerial photos 1961-1969
    Gsi1961,
    /// GSI aerial photos 1979-1983
    Gsi1984,
    /// Google satellite
    GoogleSat,
    /// Google satellite with labels
    GoogleHybrid,
    /// Google road map
    GoogleMaps,
}

impl From<BasemapChoice> for Basemap {
    fn from(choice: BasemapChoice) -> Self {
        match choice {
            BasemapChoice::Esri => Basemap::Esri,
            BasemapChoice::Gsi1974 => Basemap::Gsi1974,
            BasemapChoice::GsiPresent => Basemap::GsiPresent,
            BasemapChoice::Gsi1961 => Basemap::Gsi1961,
            BasemapChoice::Gsi1984 => Basemap::Gsi1984,
            BasemapChoice::GoogleSat => Basemap::GoogleSat,
            BasemapChoice::GoogleHybrid => Basemap::GoogleHybrid,
            BasemapChoice::GoogleMaps => Basemap::GoogleMaps,
        }
    }
}

/// Paper preset for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum PaperChoice {
    /// ISO A3 (cells with a √2 aspect ratio)
    A3,
    /// ISO A4 (same cell shape as A3)
    A4,
    /// Cells take the bbox's own aspect ratio
    Custom,
}

impl From<PaperChoice> for PaperMode {
    fn from(choice: PaperChoice) -> Self {
        match choice {
            PaperChoice::A3 => PaperMode::A3,
            PaperChoice::A4 => PaperMode::A4,
            PaperChoice::Custom => PaperMode::Custom,
        }
    }
}

/// Page orientation for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OrientationChoice {
    Landscape,
    Portrait,
}

impl From<OrientationChoice> for Orientation {
    fn from(choice: OrientationChoice) -> Self {
        match choice {
            OrientationChoice::Landscape => Orientation::Landscape,
            OrientationChoice::Portrait => Orientation::Portrait,
        }
    }
}

/// Page resolution for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ResolutionChoice {
    /// ~800 px on the long side
    Low,
    /// ~2000 px on the long side
    Medium,
    /// ~3200 px on the long side
    High,
    /// ~4800 px on the long side
    VeryHigh,
}

impl From<ResolutionChoice> for ResolutionMode {
    fn from(choice: ResolutionChoice) -> Self {
        match choice {
            ResolutionChoice::Low => ResolutionMode::Low,
            ResolutionChoice::Medium => ResolutionMode::Medium,
            ResolutionChoice::High => ResolutionMode::High,
            ResolutionChoice::VeryHigh => ResolutionMode::VeryHigh,
        }
    }
}

/// Grid layout arguments.
#[derive(Debug, Clone, Args)]
pub struct GridArgs {
    /// Area to cover: min_lng,min_lat,max_lng,max_lat
    #[arg(long, value_name = "BBOX", allow_hyphen_values = true)]
    pub bbox: GeoBBox,

    /// Number of rows (pages stacked north-south)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub rows: u32,

    /// Number of columns (pages side by side west-east)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub cols: u32,

    /// Paper preset (config default: a3)
    #[arg(long, value_enum)]
    pub paper: Option<PaperChoice>,

    /// Page orientation (config default: landscape)
    #[arg(long, value_enum)]
    pub orientation: Option<OrientationChoice>,

    /// Imagery source (config default: esri)
    #[arg(long, value_enum)]
    pub basemap: Option<BasemapChoice>,

    /// Page resolution (config default: medium)
    #[arg(long, value_enum)]
    pub resolution: Option<ResolutionChoice>,

    /// Divide the bbox exactly instead of fitting paper-shaped cells into it
    #[arg(long)]
    pub exact: bool,

    /// Shift the whole grid by DX,DY projected meters (east, north)
    #[arg(long, value_name = "DX,DY", value_parser = parse_shift, allow_hyphen_values = true)]
    pub shift_m: Option<(f64, f64)>,

    /// Config file to read instead of ~/.tilefolio/config.ini
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Parses `dx,dy` in meters.
pub fn parse_shift(s: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|m| m.is_finite())
            .ok_or_else(|| format!("'{}' is not a distance in meters", v.trim()))
    };
    Ok((parse(dx)?, parse(dy)?))
}

/// Loads `path`, or the default config file when `None`.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    ConfigFile::load_from(&path).map_err(|error| CliError::ConfigFile { path, error })
}

/// Resolve paper settings from CLI args and config.
pub fn resolve_paper(args: &GridArgs, config: &ConfigFile) -> PaperSpec {
    let mode = args
        .paper
        .map(PaperMode::from)
        .unwrap_or(config.export.paper);
    let orientation = args
        .orientation
        .map(Orientation::from)
        .unwrap_or(config.export.orientation);
    PaperSpec::new(mode, orientation)
}

/// Resolve page resolution from CLI args and config.
pub fn resolve_resolution(cli: Option<ResolutionChoice>, config: &ConfigFile) -> ResolutionMode {
    cli.map(ResolutionMode::from)
        .unwrap_or(config.export.resolution)
}

/// Resolve the tile source: a custom template wins over a named basemap,
/// which wins over the config.
pub fn resolve_source(
    cli_basemap: Option<BasemapChoice>,
    template: Option<&str>,
    max_native_zoom: Option<u8>,
    config: &ConfigFile,
) -> Result<BasemapSource, CliError> {
    if let Some(template) = template {
        let source = BasemapSource::custom(
            template,
            max_native_zoom.unwrap_or(DEFAULT_CUSTOM_NATIVE_ZOOM),
        );
        source
            .validate()
            .map_err(|_| CliError::InvalidTemplate(template.to_string()))?;
        return Ok(source);
    }

    let basemap = cli_basemap
        .map(Basemap::from)
        .unwrap_or(config.export.basemap);
    Ok(basemap.source())
}

/// Builds the grid described by `args`.
///
/// Latitudes beyond ±85.05° are clamped before partitioning, since Web
/// Mercator tiles stop there.
///
/// # Errors
///
/// Returns a config error if the bbox has no usable area, lies wholly
/// beyond the Mercator limit, or is shifted past it.
pub fn build_grid(args: &GridArgs, config: &ConfigFile) -> Result<Grid, CliError> {
    let viewport = args.bbox.clamp_to_mercator().map_err(|e| {
        CliError::Config(format!("bbox {} cannot be printed: {}", args.bbox, e))
    })?;
    if viewport != args.bbox {
        eprintln!(
            "{} bbox clamped to {}, the limit of Web Mercator tiles",
            style("Note:").yellow().bold(),
            viewport
        );
    }

    let grid = if args.exact {
        Grid::from_extent(&viewport, args.rows, args.cols)
    } else {
        Grid::partition(&viewport, args.rows, args.cols, resolve_paper(args, config))
    };

    if grid.is_empty() {
        return Err(CliError::Config(format!(
            "bbox {} has no area to divide into {}x{} cells",
            viewport, args.rows, args.cols
        )));
    }

    let Some((dx, dy)) = args.shift_m else {
        return Ok(grid);
    };
    let shifted = grid.translate(dx, dy);
    match shifted.bounds() {
        Some(bounds) if !bounds.is_projectable() => Err(CliError::Config(format!(
            "shift {},{} m moves the grid past latitude ±{:.4}",
            dx, dy, MAX_LAT
        ))),
        _ => Ok(shifted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_args() -> GridArgs {
        GridArgs {
            bbox: "135.9,35.2,136.2,35.5".parse().unwrap(),
            rows: 2,
            cols: 3,
            paper: None,
            orientation: None,
            basemap: None,
            resolution: None,
            exact: false,
            shift_m: None,
            config: None,
        }
    }

    #[test]
    fn test_parse_shift() {
        assert_eq!(parse_shift("100,-250.5"), Ok((100.0, -250.5)));
        assert_eq!(parse_shift(" 0 , 0 "), Ok((0.0, 0.0)));
        assert!(parse_shift("100").is_err());
        assert!(parse_shift("east,north").is_err());
        assert!(parse_shift("inf,0").is_err());
    }

    #[test]
    fn test_choices_match_registry_keys() {
        for basemap in Basemap::ALL {
            let choice = BasemapChoice::from_str(basemap.key(), true).unwrap();
            assert_eq!(Basemap::from(choice), basemap);
        }
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = ConfigFile::default();
        config.export.resolution = ResolutionMode::Low;
        config.export.paper = PaperMode::A4;

        assert_eq!(resolve_resolution(None, &config), ResolutionMode::Low);
        assert_eq!(
            resolve_resolution(Some(ResolutionChoice::VeryHigh), &config),
            ResolutionMode::VeryHigh
        );

        let mut args = grid_args();
        assert_eq!(resolve_paper(&args, &config).mode, PaperMode::A4);
        args.paper = Some(PaperChoice::Custom);
        args.orientation = Some(OrientationChoice::Portrait);
        let paper = resolve_paper(&args, &config);
        assert_eq!(paper, PaperSpec::new(PaperMode::Custom, Orientation::Portrait));
    }

    #[test]
    fn test_resolve_source() {
        let config = ConfigFile::default();

        let source = resolve_source(None, None, None, &config).unwrap();
        assert_eq!(source, Basemap::default().source());

        let source = resolve_source(Some(BasemapChoice::GoogleSat), None, None, &config).unwrap();
        assert_eq!(source, Basemap::GoogleSat.source());

        let source = resolve_source(
            Some(BasemapChoice::GoogleSat),
            Some("https://tiles.example.org/{z}/{x}/{y}.png"),
            Some(16),
            &config,
        )
        .unwrap();
        assert_eq!(source.name, "custom");
        assert_eq!(source.max_native_zoom, 16);

        let source =
            resolve_source(None, Some("https://t.example.org/{z}/{x}/{y}"), None, &config).unwrap();
        assert_eq!(source.max_native_zoom, DEFAULT_CUSTOM_NATIVE_ZOOM);

        assert!(matches!(
            resolve_source(None, Some("https://tiles.example.org/{z}.png"), None, &config),
            Err(CliError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_build_grid() {
        let config = ConfigFile::default();
        let mut args = grid_args();

        let fitted = build_grid(&args, &config).unwrap();
        assert_eq!(fitted.len(), 6);

        args.exact = true;
        let exact = build_grid(&args, &config).unwrap();
        let bounds = exact.bounds().unwrap();
        assert!((bounds.min().lng - 135.9).abs() < 1e-9);
        assert!((bounds.max().lat - 35.5).abs() < 1e-9);

        args.shift_m = Some((1000.0, 0.0));
        let shifted = build_grid(&args, &config).unwrap();
        assert!(shifted.bounds().unwrap().min().lng > bounds.min().lng);
        assert_eq!(shifted.len(), exact.len());
    }

    #[test]
    fn test_build_grid_clamps_polar_bbox() {
        let config = ConfigFile::default();
        let mut args = grid_args();
        args.bbox = "10,80,12,88".parse().unwrap();
        args.rows = 2;
        args.cols = 1;
        args.exact = true;

        let grid = build_grid(&args, &config).unwrap();
        let bounds = grid.bounds().unwrap();
        assert!(bounds.is_projectable());
        assert!((bounds.max().lat - MAX_LAT).abs() < 1e-6);
        assert!(grid.cells().iter().all(|c| c.bbox.is_projectable()));

        args.bbox = "10,86,12,88".parse().unwrap();
        assert!(matches!(build_grid(&args, &config), Err(CliError::Config(_))));
    }

    #[test]
    fn test_build_grid_rejects_shift_past_pole() {
        let config = ConfigFile::default();
        let mut args = grid_args();
        args.bbox = "10,80,12,85".parse().unwrap();
        args.exact = true;
        args.shift_m = Some((0.0, 500_000.0));
        assert!(matches!(build_grid(&args, &config), Err(CliError::Config(_))));

        args.shift_m = Some((0.0, -500_000.0));
        assert!(build_grid(&args, &config).is_ok());
    }

    #[test]
    fn test_missing_config_is_default() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = load_config(Some(&temp.path().join("none.ini"))).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_invalid_config_names_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[export]\npaper = letter\n").unwrap();

        match load_config(Some(&path)) {
            Err(CliError::ConfigFile { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected ConfigFile error, got {:?}", other),
        }
    }
}
