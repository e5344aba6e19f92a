//! `AgriProfit` - crop recommendation and farm profit estimation
//!
//! Given an Indian postal pincode and a land area, this library resolves the
//! location, summarizes a year of historical weather, ranks crops with a
//! suitability model and estimates production cost, profit and loan
//! eligibility for the recommended crop mix.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod estimation;
pub mod input;
pub mod model;
pub mod models;
pub mod report;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use config::AgriProfitConfig;
pub use dataset::DatasetStore;
pub use error::{AgriProfitError, ErrorKind};
pub use estimation::EstimationPipeline;
pub use input::{LandArea, Pincode};
pub use model::{FeatureVector, RandomForestModel, SuitabilityModel};
pub use models::{
    CropAllocation, CropEconomicsRecord, LocationRecord, RainfallCondition, Recommendation,
    SuitabilityScore, WeatherSummary,
};
pub use weather::{CachedWeatherProvider, OpenMeteoClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AgriProfitError>;
