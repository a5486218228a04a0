use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    DataOrchestrator, DayClassification, OverrideTimetable, PersistenceError, SchoolIdentity,
    Session, SessionEvent, SettingsStore, providers, semester,
};

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<DataOrchestrator>,
    settings: Arc<dyn SettingsStore>,
}

impl AppState {
    pub fn new(orchestrator: DataOrchestrator, settings: Arc<dyn SettingsStore>) -> Self {
        Self::with_shared(Arc::new(orchestrator), settings)
    }

    pub fn with_shared(
        orchestrator: Arc<DataOrchestrator>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            orchestrator,
            settings,
        }
    }

    fn orchestrator(&self) -> Arc<DataOrchestrator> {
        self.orchestrator.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct DatePayload {
    date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct ShiftPayload {
    days: i64,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub classification: DayClassification,
    pub semester: u8,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/briefing", get(get_session))
        .route("/refresh", post(refresh))
        .route("/date", put(set_date))
        .route("/date/shift", post(shift_date))
        .route("/settings/school", put(set_school))
        .route("/settings/timetable", put(set_timetable))
        .route("/schools", get(search_schools))
        .route("/calendar/:date", get(classify_date))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_session(State(state): State<AppState>) -> Json<Session> {
    Json(state.orchestrator().session())
}

async fn dispatch(state: &AppState, event: SessionEvent) -> Json<Session> {
    let orchestrator = state.orchestrator();
    orchestrator.dispatch(event).await;
    Json(orchestrator.session())
}

async fn refresh(State(state): State<AppState>) -> Json<Session> {
    dispatch(&state, SessionEvent::Refresh).await
}

async fn set_date(
    State(state): State<AppState>,
    Json(payload): Json<DatePayload>,
) -> Json<Session> {
    dispatch(&state, SessionEvent::DateChanged(payload.date)).await
}

async fn shift_date(
    State(state): State<AppState>,
    Json(payload): Json<ShiftPayload>,
) -> Json<Session> {
    dispatch(&state, SessionEvent::ShiftDays(payload.days)).await
}

async fn set_school(
    State(state): State<AppState>,
    Json(school): Json<SchoolIdentity>,
) -> Result<Json<Session>, ApiError> {
    let session = dispatch(&state, SessionEvent::SchoolChanged(school)).await;
    state.orchestrator().save_settings(state.settings.as_ref())?;
    Ok(session)
}

async fn set_timetable(
    State(state): State<AppState>,
    Json(overrides): Json<OverrideTimetable>,
) -> Result<Json<Session>, ApiError> {
    let session = dispatch(&state, SessionEvent::OverrideChanged(overrides)).await;
    state.orchestrator().save_settings(state.settings.as_ref())?;
    Ok(session)
}

async fn search_schools(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<SchoolIdentity>> {
    let directory = state.orchestrator().sources().directory.clone();
    Json(providers::search_schools(directory.as_ref(), &params.query).await)
}

async fn classify_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<CalendarDay>, ApiError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::invalid(format!("'{date}' is not a YYYY-MM-DD date")))?;
    let classification = state.orchestrator().calendar().classify(date);
    Ok(Json(CalendarDay {
        date,
        classification,
        semester: semester(date.month()),
    }))
}
