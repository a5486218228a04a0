//! Client configuration and environment variable handling.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_NEIS_API_URL: &str = "https://open.neis.go.kr/hub/";
pub const DEFAULT_GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1";
pub const DEFAULT_FORECAST_DAYS: u32 = 7;
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Endpoints and tunables for the provider clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Education data API key; requests are sent without one when empty
    pub neis_api_key: String,
    pub neis_api_url: String,
    pub geocode_url: String,
    pub forecast_url: String,
    /// Forecast horizon requested from the weather provider
    pub forecast_days: u32,
    /// Rows per page for education data requests
    pub page_size: u32,
    pub settings_path: PathBuf,
    pub http_addr: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            neis_api_key: String::new(),
            neis_api_url: DEFAULT_NEIS_API_URL.to_string(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            settings_path: default_settings_path(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
        }
    }
}

impl ClientConfig {
    /// Build the configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `NEIS_API_KEY` (optional): education data API key
    /// - `NEIS_API_URL` (optional, default: `https://open.neis.go.kr/hub/`)
    /// - `OPEN_METEO_GEOCODE_URL` (optional): geocoding base URL
    /// - `OPEN_METEO_FORECAST_URL` (optional): forecast base URL
    /// - `FORECAST_DAYS` (optional, default: 7)
    /// - `NEIS_PAGE_SIZE` (optional, default: 100)
    /// - `SCHOOL_BRIEFING_SETTINGS` (optional): settings file path
    /// - `SCHOOL_BRIEFING_HTTP_ADDR` (optional, default: `127.0.0.1:3000`)
    ///
    /// # Errors
    /// Returns an error if a numeric variable is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            neis_api_key: env::var("NEIS_API_KEY").unwrap_or(defaults.neis_api_key),
            neis_api_url: env::var("NEIS_API_URL").unwrap_or(defaults.neis_api_url),
            geocode_url: env::var("OPEN_METEO_GEOCODE_URL").unwrap_or(defaults.geocode_url),
            forecast_url: env::var("OPEN_METEO_FORECAST_URL").unwrap_or(defaults.forecast_url),
            forecast_days: positive_from_env("FORECAST_DAYS", defaults.forecast_days)?,
            page_size: positive_from_env("NEIS_PAGE_SIZE", defaults.page_size)?,
            settings_path: env::var("SCHOOL_BRIEFING_SETTINGS")
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_path),
            http_addr: env::var("SCHOOL_BRIEFING_HTTP_ADDR").unwrap_or(defaults.http_addr),
        })
    }
}

fn positive_from_env(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_positive(name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("school-briefing")
        .join("settings.json")
}
