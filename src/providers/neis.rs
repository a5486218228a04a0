//! NEIS open education data client: cafeteria menus, timetables and the
//! school directory.

use super::{
    MealProvider, MealQuery, ProviderError, ProviderResult, SchoolDirectory, TimetableProvider,
    TimetableQuery, get_json, http_client,
};
use crate::config::ClientConfig;
use crate::menu::MealRow;
use crate::school::{SchoolIdentity, SchoolLevel};
use crate::timetable::TimetableRow;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

const MEAL_SERVICE: &str = "mealServiceDietInfo";
const SCHOOL_SERVICE: &str = "schoolInfo";
/// Result code for a well-formed query that matched nothing.
const NO_DATA_CODE: &str = "INFO-200";

#[derive(Debug, Deserialize)]
struct ResultStatus {
    #[serde(rename = "CODE")]
    code: String,
    #[serde(rename = "MESSAGE", default)]
    message: String,
}

impl ResultStatus {
    fn into_outcome<T>(self) -> ProviderResult<Option<T>> {
        if self.code == NO_DATA_CODE || self.code.starts_with("INFO-000") {
            Ok(None)
        } else {
            Err(ProviderError::Service {
                code: self.code,
                message: self.message,
            })
        }
    }
}

/// Pull the `row` array out of a service envelope.
///
/// `Ok(None)` means the service answered but had no rows for the query.
pub(crate) fn extract_rows<T: DeserializeOwned>(
    body: Value,
    service: &str,
) -> ProviderResult<Option<Vec<T>>> {
    if let Some(sections) = body.get(service).and_then(Value::as_array) {
        let mut rows = None;
        for section in sections {
            if let Some(result) = section
                .get("head")
                .and_then(Value::as_array)
                .and_then(|head| head.iter().find_map(|item| item.get("RESULT")))
            {
                let status: ResultStatus = serde_json::from_value(result.clone())?;
                if status.code.starts_with("ERROR") {
                    return status.into_outcome();
                }
            }
            if let Some(found) = section.get("row") {
                rows = Some(serde_json::from_value::<Vec<T>>(found.clone())?);
            }
        }
        return Ok(rows);
    }

    if let Some(result) = body.get("RESULT") {
        let status: ResultStatus = serde_json::from_value(result.clone())?;
        return status.into_outcome();
    }

    Err(ProviderError::Malformed(format!(
        "response has neither '{service}' nor 'RESULT'"
    )))
}

#[derive(Debug, Deserialize)]
pub(crate) struct SchoolRow {
    #[serde(rename = "SCHUL_NM", default)]
    name: String,
    #[serde(rename = "SD_SCHUL_CODE", default)]
    code: String,
    #[serde(rename = "ATPT_OFCDC_SC_CODE", default)]
    region_code: String,
    #[serde(rename = "LCTN_SC_NM", default)]
    location_name: String,
    #[serde(rename = "SCHUL_KND_SC_NM", default)]
    kind: String,
}

impl From<SchoolRow> for SchoolIdentity {
    fn from(row: SchoolRow) -> Self {
        SchoolIdentity::new(row.name, row.code, row.region_code, row.location_name)
            .with_level(SchoolLevel::from_kind_name(&row.kind))
    }
}

pub struct NeisClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl NeisClient {
    pub fn new(config: &ClientConfig) -> ProviderResult<Self> {
        let mut base_url = config.neis_api_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            client: http_client()?,
            base_url,
            api_key: config.neis_api_key.clone(),
            page_size: config.page_size,
        })
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        service: &str,
        params: Vec<(&str, String)>,
    ) -> ProviderResult<Option<Vec<T>>> {
        let url = format!("{}{}", self.base_url, service);
        let mut query = vec![
            ("Type", "json".to_string()),
            ("pIndex", "1".to_string()),
            ("pSize", self.page_size.to_string()),
        ];
        if !self.api_key.is_empty() {
            query.push(("KEY", self.api_key.clone()));
        }
        query.extend(params);

        let body: Value = get_json(&self.client, &url, &query).await?;
        let rows = extract_rows(body, service)?;
        debug!(
            service,
            rows = rows.as_ref().map(Vec::len).unwrap_or(0),
            "education data response"
        );
        Ok(rows)
    }
}

#[async_trait]
impl MealProvider for NeisClient {
    async fn meals(&self, query: &MealQuery) -> ProviderResult<Option<Vec<MealRow>>> {
        self.fetch_rows(
            MEAL_SERVICE,
            vec![
                ("ATPT_OFCDC_SC_CODE", query.region_code.clone()),
                ("SD_SCHUL_CODE", query.school_code.clone()),
                ("MLSV_YMD", query.date.clone()),
            ],
        )
        .await
    }
}

#[async_trait]
impl TimetableProvider for NeisClient {
    async fn timetable(&self, query: &TimetableQuery) -> ProviderResult<Option<Vec<TimetableRow>>> {
        self.fetch_rows(
            query.level.timetable_service(),
            vec![
                ("ATPT_OFCDC_SC_CODE", query.region_code.clone()),
                ("SD_SCHUL_CODE", query.school_code.clone()),
                ("AY", query.year.to_string()),
                ("SEM", query.semester.to_string()),
                ("ALL_TI_YMD", query.date.clone()),
                ("GRADE", query.grade.clone()),
                ("CLASS_NM", query.class_section.clone()),
            ],
        )
        .await
    }
}

#[async_trait]
impl SchoolDirectory for NeisClient {
    async fn search(&self, fragment: &str) -> ProviderResult<Vec<SchoolIdentity>> {
        let rows: Option<Vec<SchoolRow>> = self
            .fetch_rows(SCHOOL_SERVICE, vec![("SCHUL_NM", fragment.to_string())])
            .await?;
        Ok(rows
            .unwrap_or_default()
            .into_iter()
            .map(SchoolIdentity::from)
            .collect())
    }
}
