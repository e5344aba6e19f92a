//! Startup wiring: build the shared pipeline from configuration

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cache::PersistentCache;
use crate::config::AgriProfitConfig;
use crate::dataset::DatasetStore;
use crate::estimation::EstimationPipeline;
use crate::model::RandomForestModel;
use crate::weather::{CachedWeatherProvider, OpenMeteoClient, WeatherProvider};

/// Load the reference tables and model, and assemble the weather provider
pub fn build_pipeline(config: &AgriProfitConfig) -> Result<EstimationPipeline> {
    let store = DatasetStore::load(&config.data.pincodes_path, &config.data.economics_path)
        .context("Failed to load reference tables")?;

    let model = RandomForestModel::load(&config.data.model_path)
        .context("Failed to load suitability model")?;

    for class in &model.classes {
        if store.lookup_economics(class).is_err() {
            warn!("Model crop '{}' has no economics data and will never be recommended", class);
        }
    }

    let weather = build_weather_provider(config)?;

    Ok(EstimationPipeline::new(
        Arc::new(store),
        weather,
        Arc::new(model),
        config.estimation.clone(),
    ))
}

fn build_weather_provider(config: &AgriProfitConfig) -> Result<Arc<dyn WeatherProvider>> {
    let client: Arc<dyn WeatherProvider> =
        Arc::new(OpenMeteoClient::new(&config.weather).context("Failed to create weather client")?);

    if !config.cache.enabled {
        info!("Weather cache disabled");
        return Ok(client);
    }

    let cache_dir = config.cache_dir();
    let cache = PersistentCache::open(&cache_dir)
        .with_context(|| format!("Failed to open weather cache at {}", cache_dir.display()))?;
    info!("Weather cache at {}", cache_dir.display());

    Ok(Arc::new(CachedWeatherProvider::new(
        client,
        cache,
        config.weather.archive_year,
        Duration::from_secs(u64::from(config.cache.ttl_hours) * 3600),
    )))
}
