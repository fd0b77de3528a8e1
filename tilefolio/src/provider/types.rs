//! Provider types and errors

use std::fmt;

/// Errors that can occur while talking to a tile provider.
///
/// Inside a cell render these never escape: a failed tile is logged and
/// left blank. They surface to callers only from configuration checks.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed or returned a non-2xx status
    HttpError(String),
    /// Response body could not be decoded as an image
    InvalidResponse(String),
    /// Tile did not arrive within the per-tile timeout
    Timeout { url: String, secs: u64 },
    /// URL template lacks one of the `{z}`, `{x}`, `{y}` placeholders
    InvalidTemplate(String),
    /// Name that is not in the basemap registry
    UnknownBasemap(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::Timeout { url, secs } => {
                write!(f, "Timed out after {}s fetching {}", secs, url)
            }
            ProviderError::InvalidTemplate(template) => write!(
                f,
                "Tile URL template '{}' must contain {{z}}, {{x}} and {{y}}",
                template
            ),
            ProviderError::UnknownBasemap(name) => write!(f, "Unknown basemap '{}'", name),
        }
    }
}

impl std::error::Error for ProviderError {}
