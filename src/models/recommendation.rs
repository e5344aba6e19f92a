//! Recommendation model: the final result of one estimation request

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{LocationRecord, SuitabilityScore, WeatherSummary};

/// Land share and financials of one selected crop
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CropAllocation {
    pub crop_name: String,
    /// Model suitability score of the crop
    pub score: f64,
    /// Share of the land allocated to this crop (0-1)
    pub fraction: f64,
    /// Hectares allocated to this crop
    pub allocated_area: f64,
    /// Cost of production for the allocated area (₹)
    pub cost: f64,
    /// Gross revenue for the allocated area (₹)
    pub revenue: f64,
    /// Revenue minus cost (₹)
    pub profit: f64,
}

/// Crop recommendation with cost, profit and loan estimates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recommendation {
    pub location: LocationRecord,
    pub weather: WeatherSummary,
    /// Full model ranking, best first
    pub ranked_crops: Vec<SuitabilityScore>,
    /// Land fraction per selected crop; fractions sum to 1.0
    pub crop_ratio: BTreeMap<String, f64>,
    /// Selected crops in rank order with their financials
    pub allocations: Vec<CropAllocation>,
    /// Requested land area in hectares
    pub land_area: f64,
    pub estimated_cost: f64,
    pub estimated_profit: f64,
    pub estimated_loan: f64,
}

impl Recommendation {
    /// Simplified integer ratio between the selected crops' scores.
    ///
    /// Scores are truncated to thousandths and divided by their common
    /// divisor, so 0.85 / 0.78 renders as "85:78" and 2/3 / 1/3 as "2:1".
    /// A single crop renders as
    /// "<crop> (single recommendation)".
    #[must_use]
    pub fn ratio_display(&self) -> String {
        match self.allocations.as_slice() {
            [] => "No clear recommendation".to_string(),
            [only] => format!("{} (single recommendation)", only.crop_name),
            allocations => {
                let parts: Vec<u64> = allocations
                    .iter()
                    .map(|a| (a.score * 1000.0).trunc() as u64)
                    .collect();
                let divisor = parts.iter().copied().fold(0, gcd).max(1);
                parts
                    .iter()
                    .map(|p| (p / divisor).to_string())
                    .collect::<Vec<_>>()
                    .join(":")
            }
        }
    }

    /// Sum of the ratio fractions, 1.0 for a well-formed recommendation
    #[must_use]
    pub fn ratio_total(&self) -> f64 {
        self.crop_ratio.values().sum()
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RainfallCondition;

    fn allocation(crop: &str, score: f64, fraction: f64) -> CropAllocation {
        CropAllocation {
            crop_name: crop.to_string(),
            score,
            fraction,
            allocated_area: fraction,
            cost: 0.0,
            revenue: 0.0,
            profit: 0.0,
        }
    }

    fn recommendation(allocations: Vec<CropAllocation>) -> Recommendation {
        Recommendation {
            location: LocationRecord {
                pincode: "613005".to_string(),
                district: "Thanjavur".to_string(),
                state: "Tamil Nadu".to_string(),
                latitude: 10.787,
                longitude: 79.138,
            },
            weather: WeatherSummary {
                temperature: 28.0,
                humidity: 70.0,
                rainfall: 1000.0,
                condition: RainfallCondition::Moderate,
            },
            ranked_crops: vec![],
            crop_ratio: allocations
                .iter()
                .map(|a| (a.crop_name.clone(), a.fraction))
                .collect(),
            allocations,
            land_area: 1.0,
            estimated_cost: 0.0,
            estimated_profit: 0.0,
            estimated_loan: 0.0,
        }
    }

    #[test]
    fn test_ratio_display_two_crops() {
        let rec = recommendation(vec![
            allocation("maize", 0.85, 0.5215),
            allocation("chickpea", 0.78, 0.4785),
        ]);
        assert_eq!(rec.ratio_display(), "85:78");
        assert!((rec.ratio_total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ratio_display_truncates_thirds() {
        let rec = recommendation(vec![
            allocation("maize", 2.0 / 3.0, 2.0 / 3.0),
            allocation("paddy", 1.0 / 3.0, 1.0 / 3.0),
        ]);
        assert_eq!(rec.ratio_display(), "2:1");
    }

    #[test]
    fn test_ratio_display_reduces_common_divisor() {
        let rec = recommendation(vec![
            allocation("maize", 0.6, 0.6),
            allocation("paddy", 0.4, 0.4),
        ]);
        assert_eq!(rec.ratio_display(), "3:2");
    }

    #[test]
    fn test_ratio_display_single_and_empty() {
        let rec = recommendation(vec![allocation("maize", 0.9, 1.0)]);
        assert_eq!(rec.ratio_display(), "maize (single recommendation)");

        let rec = recommendation(vec![]);
        assert_eq!(rec.ratio_display(), "No clear recommendation");
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(850, 780), 10);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(7, 0), 7);
    }
}
