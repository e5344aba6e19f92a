//! Crop suitability model
//!
//! The model is an opaque `predict(features) -> ranked scores` capability.
//! [`RandomForestModel`] is the shipped implementation, loaded from a JSON
//! artifact trained offline.

use serde::{Deserialize, Serialize};

use crate::models::{LocationRecord, SuitabilityScore, WeatherSummary};
use crate::{AgriProfitError, Result};

pub mod forest;

pub use forest::RandomForestModel;

/// Model input assembled from location, weather and land area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub land_area: f64,
}

impl FeatureVector {
    /// Names accepted by [`FeatureVector::get`]
    pub const NAMES: [&'static str; 6] = [
        "temperature",
        "humidity",
        "rainfall",
        "latitude",
        "longitude",
        "land_area",
    ];

    #[must_use]
    pub fn new(location: &LocationRecord, weather: &WeatherSummary, land_area: f64) -> Self {
        Self {
            temperature: weather.temperature,
            humidity: weather.humidity,
            rainfall: weather.rainfall,
            latitude: location.latitude,
            longitude: location.longitude,
            land_area,
        }
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Result<f64> {
        match name {
            "temperature" => Ok(self.temperature),
            "humidity" => Ok(self.humidity),
            "rainfall" => Ok(self.rainfall),
            "latitude" => Ok(self.latitude),
            "longitude" => Ok(self.longitude),
            "land_area" => Ok(self.land_area),
            other => Err(AgriProfitError::model(format!("Unknown feature '{other}'"))),
        }
    }
}

/// Scores candidate crops for a feature vector
pub trait SuitabilityModel: Send + Sync {
    /// Scores for every crop the model knows, sorted by descending score
    fn predict(&self, features: &FeatureVector) -> Result<Vec<SuitabilityScore>>;
}

/// Sort scores best first; equal scores fall back to crop name for a stable order
pub fn rank_scores(scores: &mut [SuitabilityScore]) {
    scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.crop_name.cmp(&b.crop_name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_lookup() {
        let features = FeatureVector {
            temperature: 28.0,
            humidity: 70.0,
            rainfall: 1000.0,
            latitude: 10.8,
            longitude: 79.1,
            land_area: 2.0,
        };
        for name in FeatureVector::NAMES {
            assert!(features.get(name).is_ok());
        }
        assert_eq!(features.get("rainfall").unwrap(), 1000.0);
        assert!(features.get("soil_ph").is_err());
    }

    #[test]
    fn test_rank_scores() {
        let mut scores = vec![
            SuitabilityScore::new("paddy", 0.6),
            SuitabilityScore::new("maize", 0.85),
            SuitabilityScore::new("chickpea", 0.6),
        ];
        rank_scores(&mut scores);
        let names: Vec<_> = scores.iter().map(|s| s.crop_name.as_str()).collect();
        assert_eq!(names, ["maize", "chickpea", "paddy"]);
    }
}
