//! Crop economics reference rows and suitability scores

use serde::{Deserialize, Serialize};

/// Per-hectare economics of one crop
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CropEconomicsRecord {
    #[serde(rename = "crop")]
    pub crop_name: String,
    /// Cost of production per hectare (₹)
    pub cost_per_hectare: f64,
    /// Expected yield per hectare (quintal)
    pub expected_yield_per_hectare: f64,
    /// Market price per unit of yield (₹ per quintal)
    pub market_price_per_unit: f64,
}

impl CropEconomicsRecord {
    /// Gross revenue for one hectare
    #[must_use]
    pub fn revenue_per_hectare(&self) -> f64 {
        self.expected_yield_per_hectare * self.market_price_per_unit
    }
}

/// Model confidence that a crop suits the given conditions
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SuitabilityScore {
    pub crop_name: String,
    /// Score in [0, 1]
    pub score: f64,
}

impl SuitabilityScore {
    pub fn new(crop_name: impl Into<String>, score: f64) -> Self {
        Self {
            crop_name: crop_name.into(),
            score,
        }
    }

    /// Score as a percentage string, e.g. "85.0%"
    #[must_use]
    pub fn format_percentage(&self) -> String {
        format!("{:.1}%", self.score * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_hectare_economics() {
        let maize = CropEconomicsRecord {
            crop_name: "Maize".to_string(),
            cost_per_hectare: 40_000.0,
            expected_yield_per_hectare: 30.0,
            market_price_per_unit: 2_000.0,
        };
        assert_eq!(maize.revenue_per_hectare(), 60_000.0);
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(SuitabilityScore::new("maize", 0.85).format_percentage(), "85.0%");
    }
}
