//! Open-Meteo geocoding and daily forecast client.

use super::{ForecastProvider, Geocoder, ProviderResult, get_json, http_client};
use crate::config::ClientConfig;
use crate::weather::{Coordinates, DailyForecast};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,weather_code,precipitation_probability_max";

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    results: Option<Vec<GeoItem>>,
}

#[derive(Debug, Deserialize)]
struct GeoItem {
    latitude: f64,
    longitude: f64,
}

impl GeocodeResponse {
    pub(crate) fn first_match(self) -> Option<Coordinates> {
        self.results?.into_iter().next().map(|item| Coordinates {
            latitude: item.latitude,
            longitude: item.longitude,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    daily: Option<DailyForecast>,
}

impl ForecastResponse {
    pub(crate) fn into_daily(self) -> DailyForecast {
        self.daily.unwrap_or_default()
    }
}

pub struct OpenMeteoClient {
    client: reqwest::Client,
    geocode_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &ClientConfig) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client()?,
            geocode_url: config.geocode_url.trim_end_matches('/').to_string(),
            forecast_url: config.forecast_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    async fn locate(&self, region_name: &str) -> ProviderResult<Option<Coordinates>> {
        let url = format!("{}/search", self.geocode_url);
        let query = [
            ("name", region_name.to_string()),
            ("count", "1".to_string()),
            ("language", "ko".to_string()),
            ("format", "json".to_string()),
        ];
        let response: GeocodeResponse = get_json(&self.client, &url, &query).await?;
        let found = response.first_match();
        debug!(%region_name, ?found, "geocoded region");
        Ok(found)
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn daily_forecast(&self, at: Coordinates, days: u32) -> ProviderResult<DailyForecast> {
        let url = format!("{}/forecast", self.forecast_url);
        let query = [
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", days.to_string()),
        ];
        let response: ForecastResponse = get_json(&self.client, &url, &query).await?;
        Ok(response.into_daily())
    }
}
