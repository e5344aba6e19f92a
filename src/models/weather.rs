//! Weather summary model and display methods

use serde::{Deserialize, Serialize};
use std::fmt;

/// Annual rainfall below this is considered dry (mm)
pub const DRY_RAINFALL_MM: f64 = 750.0;
/// Annual rainfall at or above this is considered heavy (mm)
pub const HEAVY_RAINFALL_MM: f64 = 1500.0;

/// Coarse rainfall classification of a year
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RainfallCondition {
    Dry,
    Moderate,
    Heavy,
}

impl RainfallCondition {
    /// Classify a total annual rainfall in millimetres
    #[must_use]
    pub fn from_annual_rainfall(rainfall_mm: f64) -> Self {
        if rainfall_mm < DRY_RAINFALL_MM {
            RainfallCondition::Dry
        } else if rainfall_mm < HEAVY_RAINFALL_MM {
            RainfallCondition::Moderate
        } else {
            RainfallCondition::Heavy
        }
    }
}

impl fmt::Display for RainfallCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RainfallCondition::Dry => "Dry",
            RainfallCondition::Moderate => "Moderate",
            RainfallCondition::Heavy => "Heavy",
        };
        f.write_str(label)
    }
}

/// Annual weather summary used as model input
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSummary {
    /// Mean daily temperature over the year in Celsius
    pub temperature: f64,
    /// Mean daily relative humidity over the year in percent
    pub humidity: f64,
    /// Total precipitation over the year in mm
    pub rainfall: f64,
    pub condition: RainfallCondition,
}

impl WeatherSummary {
    /// Build a summary, deriving the rainfall condition
    #[must_use]
    pub fn new(temperature: f64, humidity: f64, rainfall: f64) -> Self {
        Self {
            temperature,
            humidity,
            rainfall,
            condition: RainfallCondition::from_annual_rainfall(rainfall),
        }
    }

    /// One-line summary, e.g. "Avg. Temperature: 28.41 °C | Avg. Humidity: 72.10% | Total Rainfall: 1043.20 mm (Moderate)"
    #[must_use]
    pub fn format_summary(&self) -> String {
        format!(
            "Avg. Temperature: {:.2} °C | Avg. Humidity: {:.2}% | Total Rainfall: {:.2} mm ({})",
            self.temperature, self.humidity, self.rainfall, self.condition
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, RainfallCondition::Dry)]
    #[case(749.9, RainfallCondition::Dry)]
    #[case(750.0, RainfallCondition::Moderate)]
    #[case(1499.0, RainfallCondition::Moderate)]
    #[case(1500.0, RainfallCondition::Heavy)]
    #[case(3200.0, RainfallCondition::Heavy)]
    fn test_rainfall_condition(#[case] rainfall: f64, #[case] expected: RainfallCondition) {
        assert_eq!(RainfallCondition::from_annual_rainfall(rainfall), expected);
    }

    #[test]
    fn test_format_summary() {
        let summary = WeatherSummary::new(28.414, 72.1, 1043.2);
        assert_eq!(summary.condition, RainfallCondition::Moderate);
        assert_eq!(
            summary.format_summary(),
            "Avg. Temperature: 28.41 °C | Avg. Humidity: 72.10% | Total Rainfall: 1043.20 mm (Moderate)"
        );
    }
}
