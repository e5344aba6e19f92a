//! Configuration management for the `AgriProfit` estimator
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AgriProfitError;
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `AgriProfit` estimator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgriProfitConfig {
    /// Reference data and model artifact locations
    #[serde(default)]
    pub data: DataConfig,
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Crop selection and loan policy
    #[serde(default)]
    pub estimation: EstimationConfig,
    /// Weather cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Locations of the read-only inputs loaded at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Pincode to location CSV
    #[serde(default = "default_pincodes_path")]
    pub pincodes_path: PathBuf,
    /// Crop economics CSV
    #[serde(default = "default_economics_path")]
    pub economics_path: PathBuf,
    /// Suitability model JSON artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the Open-Meteo historical archive API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Calendar year summarised for each location
    #[serde(default = "default_archive_year")]
    pub archive_year: i32,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// Crop selection and loan policy constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationConfig {
    /// Maximum number of crops in a recommendation
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Crops must score strictly above this to be selected
    #[serde(default = "default_min_suitability")]
    pub min_suitability: f64,
    /// Loan estimate as a fraction of the production cost
    #[serde(default = "default_loan_to_cost_ratio")]
    pub loan_to_cost_ratio: f64,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether weather summaries are cached on disk
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Cache TTL in hours
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

// Default value functions
fn default_pincodes_path() -> PathBuf {
    PathBuf::from("data/pincodes.csv")
}

fn default_economics_path() -> PathBuf {
    PathBuf::from("data/crop_economics.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("data/suitability_model.json")
}

fn default_weather_base_url() -> String {
    "https://archive-api.open-meteo.com/v1".to_string()
}

fn default_archive_year() -> i32 {
    2023
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_top_k() -> usize {
    2
}

fn default_min_suitability() -> f64 {
    0.0
}

fn default_loan_to_cost_ratio() -> f64 {
    0.80
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u32 {
    168
}

fn default_cache_location() -> String {
    "~/.cache/agriprofit".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    30
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            pincodes_path: default_pincodes_path(),
            economics_path: default_economics_path(),
            model_path: default_model_path(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            archive_year: default_archive_year(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_suitability: default_min_suitability(),
            loan_to_cost_ratio: default_loan_to_cost_ratio(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_hours: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl AgriProfitConfig {
    /// Load configuration from the given file (or the default location) and the environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|p| p.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. AGRIPROFIT_ESTIMATION__TOP_K=3
        builder = builder.add_source(
            Environment::with_prefix("AGRIPROFIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AgriProfitConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("agriprofit").join("config.toml"))
    }

    /// Cache directory with a leading `~` expanded to the home directory
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        match self.cache.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.cache.location)),
            None => PathBuf::from(&self.cache.location),
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.estimation.top_k == 0 {
            self.estimation.top_k = default_top_k();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        // Trailing slashes would produce "//archive" request paths
        while self.weather.base_url.ends_with('/') {
            self.weather.base_url.pop();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 120 {
            return Err(
                AgriProfitError::config("Weather API timeout cannot exceed 120 seconds").into(),
            );
        }

        // Only completed years have a full daily series
        let last_complete_year = Utc::now().year() - 1;
        if !(1940..=last_complete_year).contains(&self.weather.archive_year) {
            return Err(AgriProfitError::config(format!(
                "Weather archive year {} must be between 1940 and {last_complete_year}",
                self.weather.archive_year
            ))
            .into());
        }

        if self.estimation.top_k == 0 || self.estimation.top_k > 10 {
            return Err(AgriProfitError::config("top_k must be between 1 and 10 crops").into());
        }

        if !(0.0..1.0).contains(&self.estimation.min_suitability) {
            return Err(AgriProfitError::config(
                "min_suitability must be in the range [0, 1)",
            )
            .into());
        }

        if !(0.0..=1.0).contains(&self.estimation.loan_to_cost_ratio) {
            return Err(AgriProfitError::config(
                "loan_to_cost_ratio must be between 0 and 1",
            )
            .into());
        }

        if self.cache.ttl_hours > 24 * 365 {
            return Err(AgriProfitError::config("Cache TTL cannot exceed one year").into());
        }

        if self.server.request_timeout_seconds > 300 {
            return Err(
                AgriProfitError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AgriProfitError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AgriProfitError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(AgriProfitError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AgriProfitConfig::default();
        assert_eq!(config.weather.base_url, "https://archive-api.open-meteo.com/v1");
        assert_eq!(config.weather.archive_year, 2023);
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.estimation.top_k, 2);
        assert_eq!(config.estimation.loan_to_cost_ratio, 0.80);
        assert_eq!(config.logging.level, "info");
        assert!(config.cache.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AgriProfitConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AgriProfitConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = AgriProfitConfig::default();
        config.estimation.loan_to_cost_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = AgriProfitConfig::default();
        config.estimation.min_suitability = 1.0;
        assert!(config.validate().is_err());

        let mut config = AgriProfitConfig::default();
        config.weather.archive_year = Utc::now().year();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("archive year"));
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = AgriProfitConfig::default();
        config.estimation.top_k = 0;
        config.weather.base_url = "http://localhost:9000/v1/".to_string();
        config.apply_defaults();
        assert_eq!(config.estimation.top_k, 2);
        assert_eq!(config.weather.base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[estimation]\ntop_k = 3\nloan_to_cost_ratio = 0.6\n\n[cache]\nenabled = false"
        )
        .unwrap();

        let config = AgriProfitConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.estimation.top_k, 3);
        assert_eq!(config.estimation.loan_to_cost_ratio, 0.6);
        assert!(!config.cache.enabled);
        // Untouched sections keep their defaults
        assert_eq!(config.weather.archive_year, 2023);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_cache_dir_expands_home() {
        let config = AgriProfitConfig::default();
        let dir = config.cache_dir();
        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.to_string_lossy().ends_with("agriprofit"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AgriProfitConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("agriprofit"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
