//! INI parsing: maps `Ini` sections and keys onto [`ConfigFile`].

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::settings::ConfigFile;
use super::ConfigFileError;
use crate::provider::Basemap;

/// Parses an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays whatever keys are
/// present. Unknown sections and keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [export]
    if let Some(section) = ini.section(Some("export")) {
        if let Some(v) = section.get("basemap") {
            config.export.basemap = v.parse::<Basemap>().map_err(|_| {
                let keys: Vec<&str> = Basemap::ALL.iter().map(|b| b.key()).collect();
                invalid("export", "basemap", v, format!("must be one of: {}", keys.join(", ")))
            })?;
        }
        if let Some(v) = parse_with("export", "resolution", section)? {
            config.export.resolution = v;
        }
        if let Some(v) = parse_with("export", "paper", section)? {
            config.export.paper = v;
        }
        if let Some(v) = parse_with("export", "orientation", section)? {
            config.export.orientation = v;
        }
        if let Some(v) = non_empty(section, "output") {
            config.export.output = expand_tilde(v);
        }
    }

    // [download]
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            config.download.timeout = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    invalid("download", "timeout", v, "must be a positive number of seconds")
                })?;
        }
        if let Some(v) = section.get("tile_timeout") {
            let secs = v.trim().parse::<u64>().map_err(|_| {
                invalid(
                    "download",
                    "tile_timeout",
                    v,
                    "must be a number of seconds (0 disables)",
                )
            })?;
            config.download.tile_timeout = (secs > 0).then_some(secs);
        }
        if let Some(v) = non_empty(section, "user_agent") {
            config.download.user_agent = v.to_string();
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

/// Parses `key` with `FromStr`, reporting the parser's message as the reason.
fn parse_with<T>(
    section_name: &str,
    key: &str,
    section: &Properties,
) -> Result<Option<T>, ConfigFileError>
where
    T: FromStr<Err = String>,
{
    section
        .get(key)
        .map(|v| v.parse::<T>().map_err(|reason| invalid(section_name, key, v, reason)))
        .transpose()
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
