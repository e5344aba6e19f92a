//! Open-Meteo historical archive client
//!
//! Fetches one calendar year of daily means for a location and reduces it to
//! an annual [`WeatherSummary`]: mean temperature, mean relative humidity and
//! total precipitation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::models::{LocationRecord, WeatherSummary};
use crate::{AgriProfitError, Result};

const DAILY_VARIABLES: &str =
    "temperature_2m_mean,relative_humidity_2m_mean,precipitation_sum";

/// Weather client for the Open-Meteo archive API (no API key required)
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    year: i32,
}

impl OpenMeteoClient {
    /// Create a new client with the configured timeout
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("AgriProfit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AgriProfitError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            year: config.archive_year,
        })
    }

    fn archive_url(&self) -> String {
        format!("{}/archive", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    #[instrument(skip(self, location), fields(pincode = %location.pincode, lat = location.latitude, lon = location.longitude))]
    async fn fetch_weather(&self, location: &LocationRecord) -> Result<WeatherSummary> {
        info!(
            "Fetching {} weather for {} ({})",
            self.year,
            location.display_name(),
            location.format_coordinates()
        );
        let start_time = Instant::now();

        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("start_date", format!("{}-01-01", self.year)),
            ("end_date", format!("{}-12-31", self.year)),
            ("daily", DAILY_VARIABLES.to_string()),
            ("timezone", "auto".to_string()),
        ];

        let response = self
            .client
            .get(self.archive_url())
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "request timed out" } else { "network error" };
                warn!("Weather request failed ({}): {}", reason, e);
                AgriProfitError::weather_fetch(format!("Open-Meteo {reason}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Open-Meteo returned HTTP {}", status);
            return Err(AgriProfitError::weather_fetch(format!(
                "Open-Meteo request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let archive: openmeteo::ArchiveResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Open-Meteo archive response: {}", e);
            AgriProfitError::weather_fetch(format!("Invalid archive data from Open-Meteo: {e}"))
        })?;

        if let Some((lat, lon)) = archive.grid_point() {
            debug!(
                "Archive resolved {} to grid point {:.3}, {:.3}",
                location.format_coordinates(),
                lat,
                lon
            );
        }
        let summary = summarize(&archive)?;
        debug!("Summarized {} archive days", archive.day_count());

        let total_duration = start_time.elapsed();
        debug!("Weather summary: {}", summary.format_summary());
        info!(
            "Retrieved weather summary in {:.3}s",
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow weather API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(summary)
    }
}

/// Reduce a daily archive response to annual figures. Null days are skipped.
pub(crate) fn summarize(response: &openmeteo::ArchiveResponse) -> Result<WeatherSummary> {
    let daily = response
        .daily
        .as_ref()
        .ok_or_else(|| AgriProfitError::weather_fetch("Archive response has no daily data"))?;

    let temperature = present_values(&daily.temperature_mean, "temperature_2m_mean")?;
    let humidity = present_values(&daily.relative_humidity_mean, "relative_humidity_2m_mean")?;
    let precipitation = present_values(&daily.precipitation_sum, "precipitation_sum")?;

    Ok(WeatherSummary::new(
        mean(&temperature),
        mean(&humidity),
        precipitation.iter().sum(),
    ))
}

fn present_values(series: &Option<Vec<Option<f64>>>, name: &str) -> Result<Vec<f64>> {
    let values: Vec<f64> = series
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|v| *v)
        .collect();

    if values.is_empty() {
        return Err(AgriProfitError::weather_fetch(format!(
            "Archive response has no values for {name}"
        )));
    }
    Ok(values)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// `Open-Meteo` archive API response structures
pub(crate) mod openmeteo {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ArchiveResponse {
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
        pub daily: Option<DailyData>,
    }

    impl ArchiveResponse {
        /// Grid cell the archive snapped the requested coordinates to
        pub fn grid_point(&self) -> Option<(f64, f64)> {
            Some((self.latitude?, self.longitude?))
        }

        pub fn day_count(&self) -> usize {
            self.daily.as_ref().map_or(0, |d| d.time.len())
        }
    }

    /// Daily series; entries are null where the archive has gaps
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        #[serde(default)]
        pub time: Vec<String>,
        #[serde(rename = "temperature_2m_mean")]
        pub temperature_mean: Option<Vec<Option<f64>>>,
        #[serde(rename = "relative_humidity_2m_mean")]
        pub relative_humidity_mean: Option<Vec<Option<f64>>>,
        pub precipitation_sum: Option<Vec<Option<f64>>>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn archive_body() -> serde_json::Value {
        json!({
            "latitude": 10.75,
            "longitude": 79.125,
            "daily": {
                "time": ["2023-01-01", "2023-01-02", "2023-01-03"],
                "temperature_2m_mean": [26.0, 28.0, null],
                "relative_humidity_2m_mean": [70.0, 80.0, 75.0],
                "precipitation_sum": [0.0, 12.5, 3.5]
            }
        })
    }

    fn location() -> LocationRecord {
        LocationRecord {
            pincode: "613005".to_string(),
            district: "Thanjavur".to_string(),
            state: "Tamil Nadu".to_string(),
            latitude: 10.787,
            longitude: 79.1378,
        }
    }

    fn client(server: &MockServer) -> OpenMeteoClient {
        let config = WeatherConfig {
            base_url: format!("{}/v1/", server.uri()),
            archive_year: 2023,
            timeout_seconds: 2,
        };
        OpenMeteoClient::new(&config).unwrap()
    }

    #[test]
    fn test_summarize_skips_nulls() {
        let response: openmeteo::ArchiveResponse = serde_json::from_value(archive_body()).unwrap();
        let summary = summarize(&response).unwrap();
        assert_eq!(summary.temperature, 27.0);
        assert_eq!(summary.humidity, 75.0);
        assert_eq!(summary.rainfall, 16.0);
    }

    #[test]
    fn test_archive_grid_point_and_days() {
        let response: openmeteo::ArchiveResponse = serde_json::from_value(archive_body()).unwrap();
        assert_eq!(response.grid_point(), Some((10.75, 79.125)));
        assert_eq!(response.day_count(), 3);

        let response: openmeteo::ArchiveResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.grid_point(), None);
        assert_eq!(response.day_count(), 0);
    }

    #[test]
    fn test_summarize_rejects_missing_series() {
        let body = json!({ "daily": { "time": [], "temperature_2m_mean": [null] } });
        let response: openmeteo::ArchiveResponse = serde_json::from_value(body).unwrap();
        let err = summarize(&response).unwrap_err();
        assert!(matches!(err, AgriProfitError::WeatherFetch { .. }));

        let response: openmeteo::ArchiveResponse = serde_json::from_value(json!({})).unwrap();
        assert!(summarize(&response).is_err());
    }

    #[tokio::test]
    async fn test_fetch_weather_queries_archive_year() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .and(query_param("start_date", "2023-01-01"))
            .and(query_param("end_date", "2023-12-31"))
            .and(query_param("latitude", "10.787"))
            .respond_with(ResponseTemplate::new(200).set_body_json(archive_body()))
            .expect(1)
            .mount(&server)
            .await;

        let summary = client(&server).fetch_weather(&location()).await.unwrap();
        assert_eq!(summary.rainfall, 16.0);
    }

    #[tokio::test]
    async fn test_fetch_weather_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).fetch_weather(&location()).await.unwrap_err();
        assert!(matches!(err, AgriProfitError::WeatherFetch { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_fetch_weather_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server).fetch_weather(&location()).await.unwrap_err();
        assert!(matches!(err, AgriProfitError::WeatherFetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_weather_timeout_is_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(archive_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).fetch_weather(&location()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
