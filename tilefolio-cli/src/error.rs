//! CLI error handling with user-facing messages.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;

use tilefolio::config::ConfigFileError;
use tilefolio::export::ExportError;
use tilefolio::provider::ProviderError;

/// Errors that stop a command before it produces its result.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(io::Error),
    /// Invalid config file or flag combination
    Config(String),
    /// Config file could not be loaded
    ConfigFile { path: PathBuf, error: ConfigFileError },
    /// Custom tile template without `{z}`, `{x}` or `{y}`
    InvalidTemplate(String),
    /// HTTP client could not be built
    HttpClient(ProviderError),
    /// Async runtime could not be started
    Runtime(io::Error),
    /// Export refused to start
    Export(ExportError),
}

impl CliError {
    /// Prints the error (plus hints where useful) and exits with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::ConfigFile { path, .. } => {
                eprintln!();
                eprintln!("Fix or remove {} and try again.", path.display());
            }
            CliError::InvalidTemplate(_) => {
                eprintln!();
                eprintln!("A custom --template must contain {{z}}, {{x}} and {{y}}, e.g.");
                eprintln!("  https://tile.example.org/{{z}}/{{x}}/{{y}}.png");
            }
            CliError::Export(ExportError::Busy) => {
                eprintln!();
                eprintln!("Wait for the running export to finish.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile { path, error } => {
                write!(f, "Failed to load '{}': {}", path.display(), error)
            }
            CliError::InvalidTemplate(template) => {
                write!(
                    f,
                    "Tile template '{}' lacks a {{z}}, {{x}} or {{y}} placeholder",
                    template
                )
            }
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Export(e) => write!(f, "Export could not start: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) | CliError::Runtime(e) => Some(e),
            CliError::ConfigFile { error, .. } => Some(error),
            CliError::HttpClient(e) => Some(e),
            CliError::Export(e) => Some(e),
            CliError::Config(_) | CliError::InvalidTemplate(_) => None,
        }
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::HttpClient(e)
    }
}
