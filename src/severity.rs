//! EPA air-quality severity levels.

use serde::Serialize;

/// Color used wherever a value is missing.
pub const NO_DATA_COLOR: &str = "#94a3b8";

/// Label used wherever a value is missing.
pub const NO_DATA_LABEL: &str = "No Data";

/// A band of the US EPA AQI scale.
///
/// Variants are declared in ascending severity, so the derived `Ord` is the
/// severity rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl SeverityLevel {
    /// Every level, least severe first.
    pub const ALL: [SeverityLevel; 6] = [
        SeverityLevel::Good,
        SeverityLevel::Moderate,
        SeverityLevel::UnhealthySensitive,
        SeverityLevel::Unhealthy,
        SeverityLevel::VeryUnhealthy,
        SeverityLevel::Hazardous,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SeverityLevel::Good => "Good",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            SeverityLevel::Unhealthy => "Unhealthy",
            SeverityLevel::VeryUnhealthy => "Very Unhealthy",
            SeverityLevel::Hazardous => "Hazardous",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SeverityLevel::Good => "#10b981",
            SeverityLevel::Moderate => "#fbbf24",
            SeverityLevel::UnhealthySensitive => "#f97316",
            SeverityLevel::Unhealthy => "#ef4444",
            SeverityLevel::VeryUnhealthy => "#a855f7",
            SeverityLevel::Hazardous => "#7f1d1d",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SeverityLevel::Good => "Air quality is satisfactory, minimal health concern",
            SeverityLevel::Moderate => {
                "Acceptable quality, some pollutants may affect sensitive individuals"
            }
            SeverityLevel::UnhealthySensitive => "Sensitive groups may experience health effects",
            SeverityLevel::Unhealthy => "Everyone may experience health effects",
            SeverityLevel::VeryUnhealthy => "Health alert - serious health effects for everyone",
            SeverityLevel::Hazardous => "Emergency conditions - entire population affected",
        }
    }

    /// Inclusive upper bound of the band; `None` for the open-ended top band.
    pub fn upper_bound(self) -> Option<f64> {
        match self {
            SeverityLevel::Good => Some(50.0),
            SeverityLevel::Moderate => Some(100.0),
            SeverityLevel::UnhealthySensitive => Some(150.0),
            SeverityLevel::Unhealthy => Some(200.0),
            SeverityLevel::VeryUnhealthy => Some(300.0),
            SeverityLevel::Hazardous => None,
        }
    }

    /// Exclusive lower bound: the previous band's upper bound (0 for `Good`,
    /// whose range is closed at 0).
    pub fn lower_bound(self) -> f64 {
        let rank = self as usize;
        if rank == 0 {
            0.0
        } else {
            Self::ALL[rank - 1].upper_bound().unwrap_or(0.0)
        }
    }

    /// The integer range printed in the EPA guide, e.g. `"51-100"` or `"301+"`.
    pub fn range_label(self) -> String {
        let low = if self == SeverityLevel::Good {
            0
        } else {
            self.lower_bound() as u32 + 1
        };
        match self.upper_bound() {
            Some(high) => format!("{}-{}", low, high as u32),
            None => format!("{low}+"),
        }
    }
}

/// Classifies an AQI value into its severity level.
///
/// Inclusive upper bounds, checked in ascending order:
///
/// | AQI         | Level                          |
/// |-------------|--------------------------------|
/// | <= 50       | Good                           |
/// | <= 100      | Moderate                       |
/// | <= 150      | Unhealthy for Sensitive Groups |
/// | <= 200      | Unhealthy                      |
/// | <= 300      | Very Unhealthy                 |
/// | > 300       | Hazardous                      |
///
/// Negative input is not rejected and lands in `Good`.
pub fn classify(aqi: f64) -> SeverityLevel {
    match aqi {
        a if a <= 50.0 => SeverityLevel::Good,
        a if a <= 100.0 => SeverityLevel::Moderate,
        a if a <= 150.0 => SeverityLevel::UnhealthySensitive,
        a if a <= 200.0 => SeverityLevel::Unhealthy,
        a if a <= 300.0 => SeverityLevel::VeryUnhealthy,
        _ => SeverityLevel::Hazardous,
    }
}

/// [`classify`] for values that may be missing.
pub fn classify_optional(aqi: Option<f64>) -> Option<SeverityLevel> {
    aqi.map(classify)
}

/// Display color for a possibly-missing value.
pub fn color_for(aqi: Option<f64>) -> &'static str {
    classify_optional(aqi).map_or(NO_DATA_COLOR, SeverityLevel::color)
}

/// Display label for a possibly-missing value.
pub fn label_for(aqi: Option<f64>) -> &'static str {
    classify_optional(aqi).map_or(NO_DATA_LABEL, SeverityLevel::label)
}
