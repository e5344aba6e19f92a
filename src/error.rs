//! Error types and handling for the `AgriProfit` estimator

use thiserror::Error;

/// Main error type for the `AgriProfit` library
#[derive(Error, Debug)]
pub enum AgriProfitError {
    /// A pincode or crop is not present in the reference tables
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The external weather service failed (network, timeout, bad payload)
    #[error("Weather fetch error: {message}")]
    WeatherFetch { message: String },

    /// No crop cleared the minimum suitability threshold
    #[error("No suitable crop: {message}")]
    NoSuitableCrop { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Reference table loading errors
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// Model artifact loading or prediction errors
    #[error("Model error: {message}")]
    Model { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Coarse classification of an [`AgriProfitError`], used by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    WeatherFetch,
    NoSuitableCrop,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::WeatherFetch => "weather_fetch",
            ErrorKind::NoSuitableCrop => "no_suitable_crop",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        }
    }
}

impl AgriProfitError {
    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new weather fetch error
    pub fn weather_fetch<S: Into<String>>(message: S) -> Self {
        Self::WeatherFetch {
            message: message.into(),
        }
    }

    /// Create a new no-suitable-crop error
    pub fn no_suitable_crop<S: Into<String>>(message: S) -> Self {
        Self::NoSuitableCrop {
            message: message.into(),
        }
    }

    /// Create a new input validation error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// Create a new model error
    pub fn model<S: Into<String>>(message: S) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgriProfitError::NotFound { .. } => ErrorKind::NotFound,
            AgriProfitError::WeatherFetch { .. } => ErrorKind::WeatherFetch,
            AgriProfitError::NoSuitableCrop { .. } => ErrorKind::NoSuitableCrop,
            AgriProfitError::InvalidInput { .. } => ErrorKind::InvalidInput,
            _ => ErrorKind::Internal,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AgriProfitError::NotFound { message } => message.clone(),
            AgriProfitError::WeatherFetch { .. } => {
                "Could not retrieve weather data for this location. Please try again later."
                    .to_string()
            }
            AgriProfitError::NoSuitableCrop { .. } => {
                "No crop is suitable enough for these conditions to make a recommendation."
                    .to_string()
            }
            AgriProfitError::InvalidInput { message } => {
                format!("Invalid input: {message}")
            }
            AgriProfitError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            AgriProfitError::Dataset { .. } | AgriProfitError::Model { .. } => {
                "Reference data could not be loaded. Please contact the administrator.".to_string()
            }
            AgriProfitError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            AgriProfitError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
