//! Weather retrieval
//!
//! A [`WeatherProvider`] turns a location into an annual [`WeatherSummary`].
//! [`OpenMeteoClient`] is the network implementation; [`CachedWeatherProvider`]
//! puts a disk cache in front of any provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::RngExt;
use tracing::{debug, warn};

use crate::Result;
use crate::cache::PersistentCache;
use crate::models::{LocationRecord, WeatherSummary};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Source of annual weather summaries
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the weather summary for a location. A single attempt; failures
    /// surface as `WeatherFetch` errors.
    async fn fetch_weather(&self, location: &LocationRecord) -> Result<WeatherSummary>;
}

/// Wraps a provider with a persistent cache keyed by rounded coordinates and year
pub struct CachedWeatherProvider {
    inner: Arc<dyn WeatherProvider>,
    cache: PersistentCache,
    year: i32,
    ttl: Duration,
}

impl CachedWeatherProvider {
    pub fn new(
        inner: Arc<dyn WeatherProvider>,
        cache: PersistentCache,
        year: i32,
        ttl: Duration,
    ) -> Self {
        Self {
            inner,
            cache,
            year,
            ttl,
        }
    }
}

#[async_trait]
impl WeatherProvider for CachedWeatherProvider {
    #[tracing::instrument(skip(self, location), fields(pincode = %location.pincode))]
    async fn fetch_weather(&self, location: &LocationRecord) -> Result<WeatherSummary> {
        let key = location.weather_cache_key(self.year);

        match self.cache.get::<WeatherSummary>(&key).await {
            Ok(Some(cached)) => {
                debug!("Using cached weather summary for {}", key);
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!("Weather cache read failed for {}: {}", key, e),
        }

        let summary = self.inner.fetch_weather(location).await?;

        // Spread expiries so entries written together do not all lapse together
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        let ttl = self.ttl.mul_f64(jitter);
        if let Err(e) = self.cache.put(&key, summary.clone(), ttl).await {
            warn!("Weather cache write failed for {}: {}", key, e);
        }

        Ok(summary)
    }
}
