//! Location model for pincode reference rows

use serde::{Deserialize, Serialize};

/// One row of the pincode reference table
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocationRecord {
    /// Six-digit postal code
    pub pincode: String,
    /// District name
    pub district: String,
    /// State name
    pub state: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl LocationRecord {
    /// Human-readable place name, e.g. "Thanjavur, Tamil Nadu"
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.district, self.state)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// Cache key for the weather summary of this location in a given archive year
    #[must_use]
    pub fn weather_cache_key(&self, year: i32) -> String {
        let (lat, lon) = self.rounded_coordinates(2);
        format!("weather:{lat:.2}:{lon:.2}:{year}")
    }

    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}
