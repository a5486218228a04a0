//! Interfaces to the external data providers.
//!
//! The orchestrator only sees these traits; `neis` and `open_meteo` hold the
//! HTTP implementations.

use crate::calendar::{compact_date, semester};
use crate::menu::MealRow;
use crate::school::{SchoolIdentity, SchoolLevel};
use crate::timetable::TimetableRow;
use crate::weather::{Coordinates, DailyForecast};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use tracing::warn;

pub mod neis;
pub mod open_meteo;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("service error {code}: {message}")]
    Service { code: String, message: String },
    #[error("unexpected response: {0}")]
    Malformed(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealQuery {
    pub region_code: String,
    pub school_code: String,
    /// `YYYYMMDD`
    pub date: String,
}

impl MealQuery {
    pub fn new(school: &SchoolIdentity, date: NaiveDate) -> Self {
        Self {
            region_code: school.region_code.clone(),
            school_code: school.code.clone(),
            date: compact_date(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableQuery {
    pub region_code: String,
    pub school_code: String,
    pub year: i32,
    pub semester: u8,
    /// `YYYYMMDD`
    pub date: String,
    pub grade: String,
    pub class_section: String,
    pub level: SchoolLevel,
}

impl TimetableQuery {
    pub fn new(school: &SchoolIdentity, date: NaiveDate) -> Self {
        Self {
            region_code: school.region_code.clone(),
            school_code: school.code.clone(),
            year: date.year(),
            semester: semester(date.month()),
            date: compact_date(date),
            grade: school.grade.clone(),
            class_section: school.class_section.clone(),
            level: school.level,
        }
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-text region name; `None` when nothing matches.
    async fn locate(&self, region_name: &str) -> ProviderResult<Option<Coordinates>>;
}

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn daily_forecast(&self, at: Coordinates, days: u32) -> ProviderResult<DailyForecast>;
}

#[async_trait]
pub trait MealProvider: Send + Sync {
    async fn meals(&self, query: &MealQuery) -> ProviderResult<Option<Vec<MealRow>>>;
}

#[async_trait]
pub trait TimetableProvider: Send + Sync {
    async fn timetable(&self, query: &TimetableQuery) -> ProviderResult<Option<Vec<TimetableRow>>>;
}

#[async_trait]
pub trait SchoolDirectory: Send + Sync {
    async fn search(&self, fragment: &str) -> ProviderResult<Vec<SchoolIdentity>>;
}

/// Search the directory, treating a blank query as "no request" and a
/// failure as "no results".
pub async fn search_schools(directory: &dyn SchoolDirectory, query: &str) -> Vec<SchoolIdentity> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    match directory.search(query).await {
        Ok(schools) => schools,
        Err(err) => {
            warn!(%query, error = %err, "school search failed");
            Vec::new()
        }
    }
}

/// GET a JSON document, mapping non-success statuses to [`ProviderError::Status`].
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> ProviderResult<T> {
    let response = client.get(url).query(query).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

pub(crate) fn http_client() -> ProviderResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("school-briefing/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(15))
        .build()?)
}
