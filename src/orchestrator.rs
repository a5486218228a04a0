//! Session state machine and the per-date loader.
//!
//! A [`Session`] owns the current date, school, override timetable and the
//! last committed [`DailyBriefing`]. Every [`SessionEvent`] bumps the
//! session generation; a load started under an older generation is dropped
//! at commit time, so a slow response can never overwrite a fresher one.

use crate::briefing::DailyBriefing;
use crate::calendar::SchoolCalendar;
use crate::config::{ClientConfig, DEFAULT_FORECAST_DAYS};
use crate::menu::MenuEntry;
use crate::persistence::{self, PersistenceResult, SettingsStore};
use crate::providers::neis::NeisClient;
use crate::providers::open_meteo::OpenMeteoClient;
use crate::providers::{
    ForecastProvider, Geocoder, MealProvider, MealQuery, ProviderResult, SchoolDirectory,
    TimetableProvider, TimetableQuery,
};
use crate::school::SchoolIdentity;
use crate::timetable::{self, OverrideTimetable, ScheduleSlot};
use crate::weather::WeatherSnapshot;
use chrono::{Datelike, Duration, NaiveDate};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The external collaborators a load talks to.
#[derive(Clone)]
pub struct Sources {
    pub geocoder: Arc<dyn Geocoder>,
    pub forecast: Arc<dyn ForecastProvider>,
    pub meals: Arc<dyn MealProvider>,
    pub timetable: Arc<dyn TimetableProvider>,
    pub directory: Arc<dyn SchoolDirectory>,
}

impl Sources {
    /// Wire the HTTP clients for NEIS and Open-Meteo.
    pub fn connect(config: &ClientConfig) -> ProviderResult<Self> {
        let meteo = Arc::new(OpenMeteoClient::new(config)?);
        let neis = Arc::new(NeisClient::new(config)?);
        Ok(Self {
            geocoder: meteo.clone(),
            forecast: meteo,
            meals: neis.clone(),
            timetable: neis.clone(),
            directory: neis,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BriefingRequest {
    pub date: NaiveDate,
    pub school: SchoolIdentity,
    pub overrides: OverrideTimetable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    DateChanged(NaiveDate),
    ShiftDays(i64),
    /// Jump to the given date as "today".
    Today(NaiveDate),
    SchoolChanged(SchoolIdentity),
    OverrideChanged(OverrideTimetable),
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
}

/// A load the caller must run and hand back to [`Session::commit`].
#[derive(Debug, Clone)]
pub struct PendingLoad {
    pub generation: u64,
    pub request: BriefingRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    date: NaiveDate,
    school: SchoolIdentity,
    overrides: OverrideTimetable,
    state: LoadState,
    generation: u64,
    briefing: Option<DailyBriefing>,
}

impl Session {
    pub fn new(date: NaiveDate) -> Self {
        Self::with_settings(date, SchoolIdentity::default(), OverrideTimetable::default())
    }

    pub fn with_settings(
        date: NaiveDate,
        school: SchoolIdentity,
        overrides: OverrideTimetable,
    ) -> Self {
        Self {
            date,
            school,
            overrides,
            state: LoadState::Idle,
            generation: 0,
            briefing: None,
        }
    }

    /// Start a session from persisted settings; missing keys fall back to
    /// empty values.
    pub fn restore(store: &dyn SettingsStore, date: NaiveDate) -> PersistenceResult<Self> {
        let school = persistence::load_school(store)?.unwrap_or_default();
        let overrides = persistence::load_overrides(store)?.unwrap_or_default();
        Ok(Self::with_settings(date, school, overrides))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn school(&self) -> &SchoolIdentity {
        &self.school
    }

    pub fn overrides(&self) -> &OverrideTimetable {
        &self.overrides
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn briefing(&self) -> Option<&DailyBriefing> {
        self.briefing.as_ref()
    }

    pub fn request(&self) -> BriefingRequest {
        BriefingRequest {
            date: self.date,
            school: self.school.clone(),
            overrides: self.overrides.clone(),
        }
    }

    /// Apply an event and decide whether a load has to run.
    ///
    /// With an incomplete school identity the session stays idle and all
    /// results are cleared.
    pub fn dispatch(&mut self, event: SessionEvent) -> Option<PendingLoad> {
        self.apply(event);
        self.generation += 1;
        self.briefing = None;

        if !self.school.is_complete() {
            debug!(generation = self.generation, "school not configured, staying idle");
            self.state = LoadState::Idle;
            return None;
        }

        self.state = LoadState::Loading;
        info!(date = %self.date, generation = self.generation, "loading briefing");
        Some(PendingLoad {
            generation: self.generation,
            request: self.request(),
        })
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::DateChanged(date) | SessionEvent::Today(date) => self.date = date,
            SessionEvent::ShiftDays(days) => {
                if let Some(date) = self.date.checked_add_signed(Duration::days(days)) {
                    self.date = date;
                }
            }
            SessionEvent::SchoolChanged(school) => self.school = school,
            SessionEvent::OverrideChanged(overrides) => self.overrides = overrides,
            SessionEvent::Refresh => {}
        }
    }

    /// Store a finished load. Returns `false` and discards the briefing when
    /// a newer event has superseded the load.
    pub fn commit(&mut self, generation: u64, briefing: DailyBriefing) -> bool {
        if generation != self.generation || self.state != LoadState::Loading {
            debug!(
                generation,
                current = self.generation,
                "discarding stale briefing"
            );
            return false;
        }
        self.briefing = Some(briefing);
        self.state = LoadState::Idle;
        true
    }

    /// Return to idle after a load that will never commit. Only the load
    /// matching the current generation can do this.
    pub fn abandon(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.state != LoadState::Loading {
            return false;
        }
        self.state = LoadState::Idle;
        true
    }
}

/// Resets the session to idle if a load is dropped before it commits.
struct LoadGuard<'a> {
    session: &'a Mutex<Session>,
    generation: u64,
    armed: bool,
}

impl<'a> LoadGuard<'a> {
    fn new(session: &'a Mutex<Session>, generation: u64) -> Self {
        Self {
            session,
            generation,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.session.lock().abandon(self.generation) {
            warn!(generation = self.generation, "load dropped before commit");
        }
    }
}

/// Load the briefing for one request.
///
/// Weather is fetched for every kind of day and settles first. Menu and
/// schedule are fetched only on a regular day, concurrently. A failing
/// source degrades to its empty value and never affects the others; a
/// panicking step is caught and degraded the same way.
pub async fn load_briefing(
    sources: &Sources,
    calendar: &SchoolCalendar,
    request: &BriefingRequest,
    forecast_days: u32,
) -> DailyBriefing {
    let classification = calendar.classify(request.date);
    let mut briefing = DailyBriefing::new(request.date, classification);

    let weather = AssertUnwindSafe(fetch_weather(
        sources,
        &request.school.region_name,
        request.date,
        forecast_days,
    ))
    .catch_unwind()
    .await;
    briefing.weather = match weather {
        Ok(Ok(weather)) => weather,
        Ok(Err(err)) => {
            warn!(date = %request.date, error = %err, "weather unavailable");
            None
        }
        Err(_) => {
            error!(date = %request.date, "weather load aborted");
            None
        }
    };

    if !briefing.classification.is_regular_day() {
        debug!(
            date = %request.date,
            classification = %briefing.classification,
            "skipping menu and schedule"
        );
        return briefing;
    }

    match AssertUnwindSafe(fetch_school_day(sources, request))
        .catch_unwind()
        .await
    {
        Ok((menu, schedule)) => {
            briefing.menu = Some(menu);
            briefing.schedule = Some(schedule);
        }
        Err(_) => {
            error!(date = %request.date, "menu and schedule load aborted");
            briefing.menu = None;
            briefing.schedule = None;
        }
    }

    briefing
}

async fn fetch_weather(
    sources: &Sources,
    region_name: &str,
    date: NaiveDate,
    forecast_days: u32,
) -> ProviderResult<Option<WeatherSnapshot>> {
    if region_name.trim().is_empty() {
        return Ok(None);
    }
    let Some(at) = sources.geocoder.locate(region_name).await? else {
        debug!(%region_name, "region not found");
        return Ok(None);
    };
    let forecast = sources.forecast.daily_forecast(at, forecast_days).await?;
    let selected = forecast.select_day(date);
    if selected.is_none() {
        debug!(%date, "date outside forecast horizon");
    }
    Ok(selected)
}

async fn fetch_school_day(
    sources: &Sources,
    request: &BriefingRequest,
) -> (MenuEntry, Vec<ScheduleSlot>) {
    let meal_query = MealQuery::new(&request.school, request.date);
    let timetable_query = TimetableQuery::new(&request.school, request.date);

    let (menu, schedule) = tokio::join!(
        sources.meals.meals(&meal_query),
        timetable::resolve(request.date.weekday(), &request.overrides, || {
            sources.timetable.timetable(&timetable_query)
        }),
    );

    let menu = match menu {
        Ok(rows) => rows.map(|rows| MenuEntry::from_rows(&rows)).unwrap_or_default(),
        Err(err) => {
            warn!(date = %request.date, error = %err, "menu unavailable");
            MenuEntry::empty()
        }
    };

    let schedule = schedule.unwrap_or_else(|err| {
        warn!(date = %request.date, error = %err, "timetable unavailable");
        Vec::new()
    });

    (menu, schedule)
}

/// Owns the session and runs loads for incoming events.
pub struct DataOrchestrator {
    sources: Sources,
    calendar: SchoolCalendar,
    forecast_days: u32,
    session: Mutex<Session>,
}

impl DataOrchestrator {
    pub fn new(sources: Sources, session: Session) -> Self {
        Self {
            sources,
            calendar: SchoolCalendar::default(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            session: Mutex::new(session),
        }
    }

    pub fn with_forecast_days(mut self, days: u32) -> Self {
        self.forecast_days = days;
        self
    }

    pub fn calendar(&self) -> &SchoolCalendar {
        &self.calendar
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn session(&self) -> Session {
        self.session.lock().clone()
    }

    pub fn briefing(&self) -> Option<DailyBriefing> {
        self.session.lock().briefing().cloned()
    }

    /// Apply an event, run the resulting load and commit it.
    ///
    /// Returns the committed briefing, or `None` when the session stayed idle
    /// or a newer event superseded this load. Dropping the future before it
    /// finishes puts the session back to idle.
    pub async fn dispatch(&self, event: SessionEvent) -> Option<DailyBriefing> {
        let pending = self.session.lock().dispatch(event)?;
        let mut guard = LoadGuard::new(&self.session, pending.generation);

        let briefing = load_briefing(
            &self.sources,
            &self.calendar,
            &pending.request,
            self.forecast_days,
        )
        .await;
        guard.disarm();

        let mut session = self.session.lock();
        if session.commit(pending.generation, briefing) {
            session.briefing().cloned()
        } else {
            None
        }
    }

    /// Persist the session's school and override timetable.
    pub fn save_settings(&self, store: &dyn SettingsStore) -> PersistenceResult<()> {
        let (school, overrides) = {
            let session = self.session.lock();
            (session.school().clone(), session.overrides().clone())
        };
        persistence::save_school(store, &school)?;
        persistence::save_overrides(store, &overrides)
    }
}
