//! Paper presets that fix the aspect ratio of grid cells.

use std::f64::consts::SQRT_2;
use std::fmt;
use std::str::FromStr;

/// Paper size preset.
///
/// ISO A-series sheets share the long/short ratio √2, so A3 and A4 differ
/// only in physical size; for the grid they impose the same cell shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperMode {
    #[default]
    A3,
    A4,
    /// Cells take the viewport's own aspect ratio
    Custom,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

/// Paper mode plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaperSpec {
    pub mode: PaperMode,
    pub orientation: Orientation,
}

impl PaperSpec {
    pub const fn new(mode: PaperMode, orientation: Orientation) -> Self {
        Self { mode, orientation }
    }

    pub const fn a4_landscape() -> Self {
        Self::new(PaperMode::A4, Orientation::Landscape)
    }

    pub const fn custom() -> Self {
        Self::new(PaperMode::Custom, Orientation::Landscape)
    }

    /// Width/height ratio every cell must have, or `None` for custom paper.
    pub fn target_aspect(&self) -> Option<f64> {
        match self.mode {
            PaperMode::A3 | PaperMode::A4 => Some(match self.orientation {
                Orientation::Landscape => SQRT_2,
                Orientation::Portrait => 1.0 / SQRT_2,
            }),
            PaperMode::Custom => None,
        }
    }
}

impl fmt::Display for PaperMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaperMode::A3 => "A3",
            PaperMode::A4 => "A4",
            PaperMode::Custom => "custom",
        })
    }
}

impl FromStr for PaperMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a3" => Ok(PaperMode::A3),
            "a4" => Ok(PaperMode::A4),
            "custom" => Ok(PaperMode::Custom),
            other => Err(format!("unknown paper mode '{}' (expected a3, a4 or custom)", other)),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        })
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "landscape" => Ok(Orientation::Landscape),
            "portrait" => Ok(Orientation::Portrait),
            other => Err(format!(
                "unknown orientation '{}' (expected landscape or portrait)",
                other
            )),
        }
    }
}

impl fmt::Display for PaperSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mode, self.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_aspect() {
        let landscape = PaperSpec::new(PaperMode::A3, Orientation::Landscape);
        let portrait = PaperSpec::new(PaperMode::A4, Orientation::Portrait);

        assert_eq!(landscape.target_aspect(), Some(SQRT_2));
        assert_eq!(portrait.target_aspect(), Some(1.0 / SQRT_2));
        assert_eq!(PaperSpec::custom().target_aspect(), None);
    }

    #[test]
    fn test_parse_paper_mode() {
        assert_eq!("A3".parse::<PaperMode>().unwrap(), PaperMode::A3);
        assert_eq!(" a4 ".parse::<PaperMode>().unwrap(), PaperMode::A4);
        assert_eq!("Custom".parse::<PaperMode>().unwrap(), PaperMode::Custom);
        assert!("letter".parse::<PaperMode>().is_err());
    }

    #[test]
    fn test_parse_orientation() {
        assert_eq!(
            "portrait".parse::<Orientation>().unwrap(),
            Orientation::Portrait
        );
        assert!("sideways".parse::<Orientation>().is_err());
    }
}
