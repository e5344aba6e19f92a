//! Data models for the AgriProfit estimator
//!
//! This module contains the core domain models organized by concern:
//! - Location: pincode reference rows and coordinates
//! - Weather: annual weather summary for a location
//! - Crop: economics reference rows and model suitability scores
//! - Recommendation: the final per-request result

pub mod crop;
pub mod location;
pub mod recommendation;
pub mod weather;

// Re-export all public types for convenient access
pub use crop::{CropEconomicsRecord, SuitabilityScore};
pub use location::LocationRecord;
pub use recommendation::{CropAllocation, Recommendation};
pub use weather::{RainfallCondition, WeatherSummary};
