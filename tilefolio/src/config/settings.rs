//! Typed configuration values and their defaults.

use std::path::PathBuf;

use crate::grid::{Orientation, PaperMode, PaperSpec};
use crate::logging::{default_log_dir, default_log_file};
use crate::provider::{Basemap, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::zoom::ResolutionMode;

/// Default PDF written by `export`.
pub const DEFAULT_OUTPUT_FILE: &str = "map_grid.pdf";

/// Contents of `config.ini`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub export: ExportSettings,
    pub download: DownloadSettings,
    pub logging: LoggingSettings,
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub basemap: Basemap,
    pub resolution: ResolutionMode,
    pub paper: PaperMode,
    pub orientation: Orientation,
    pub output: PathBuf,
}

impl ExportSettings {
    pub fn paper_spec(&self) -> PaperSpec {
        PaperSpec::new(self.paper, self.orientation)
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            basemap: Basemap::default(),
            resolution: ResolutionMode::default(),
            paper: PaperMode::default(),
            orientation: Orientation::default(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Whole-request timeout in seconds
    pub timeout: u64,
    /// Per-tile timeout in seconds; `None` waits for every tile
    pub tile_timeout: Option<u64>,
    pub user_agent: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            tile_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            file: default_log_file().to_string(),
        }
    }
}
