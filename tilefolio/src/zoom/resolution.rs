//! Output resolution presets.

use std::fmt;
use std::str::FromStr;

/// Requested page resolution.
///
/// Each mode names the nominal length, in pixels, of a page's longest side.
/// Large grids shrink this budget, see [`super::base_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionMode {
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
}

impl ResolutionMode {
    pub const ALL: [ResolutionMode; 4] = [
        ResolutionMode::Low,
        ResolutionMode::Medium,
        ResolutionMode::High,
        ResolutionMode::VeryHigh,
    ];

    /// Nominal longest page side in pixels.
    pub const fn nominal_size(&self) -> u32 {
        match self {
            ResolutionMode::Low => 800,
            ResolutionMode::Medium => 2000,
            ResolutionMode::High => 3200,
            ResolutionMode::VeryHigh => 4800,
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResolutionMode::Low => "low",
            ResolutionMode::Medium => "medium",
            ResolutionMode::High => "high",
            ResolutionMode::VeryHigh => "very-high",
        })
    }
}

impl FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "low" => Ok(ResolutionMode::Low),
            "medium" => Ok(ResolutionMode::Medium),
            "high" => Ok(ResolutionMode::High),
            "very-high" | "veryhigh" => Ok(ResolutionMode::VeryHigh),
            other => Err(format!(
                "unknown resolution '{}' (expected low, medium, high or very-high)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_sizes() {
        let sizes: Vec<u32> = ResolutionMode::ALL.iter().map(|m| m.nominal_size()).collect();
        assert_eq!(sizes, vec![800, 2000, 3200, 4800]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("veryHigh".parse::<ResolutionMode>().unwrap(), ResolutionMode::VeryHigh);
        assert_eq!("very_high".parse::<ResolutionMode>().unwrap(), ResolutionMode::VeryHigh);
        assert_eq!(" LOW ".parse::<ResolutionMode>().unwrap(), ResolutionMode::Low);
        assert!("ultra".parse::<ResolutionMode>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for mode in ResolutionMode::ALL {
            assert_eq!(mode.to_string().parse::<ResolutionMode>().unwrap(), mode);
        }
    }
}
