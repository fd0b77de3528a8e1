//! Configuration file support.
//!
//! Settings live in `~/.tilefolio/config.ini`. Every key is optional; a
//! missing file or key means the built-in default. Command-line flags
//! override whatever the file says.
//!
//! ```ini
//! [export]
//! basemap = esri
//! resolution = high
//! paper = a3
//! orientation = landscape
//! output = ~/atlases/map_grid.pdf
//!
//! [download]
//! timeout = 30
//! tile_timeout = 0
//! user_agent = tilefolio/0.1
//!
//! [logging]
//! directory = ~/.tilefolio/logs
//! file = tilefolio.log
//! ```

mod parser;
mod settings;

pub use settings::{
    ConfigFile, DownloadSettings, ExportSettings, LoggingSettings, DEFAULT_OUTPUT_FILE,
};

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

/// Errors from loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Loads from the default path.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parser::parse_ini(&ini)
    }
}

/// Config directory (`~/.tilefolio`).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tilefolio")
}

/// Config file (`~/.tilefolio/config.ini`).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
