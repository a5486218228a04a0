mod common;

use async_trait::async_trait;
use futures::FutureExt;
use chrono::Weekday;
use common::{Fixture, Outcome, d, school};
use school_briefing::providers::{Geocoder, ProviderResult, search_schools};
use school_briefing::weather::Coordinates;
use school_briefing::{
    DataOrchestrator, DayClassification, LoadState, MemorySettingsStore, MenuEntry,
    OverrideTimetable, ScheduleSlot, Session, SessionEvent, SchoolCalendar, load_briefing,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

fn orchestrator(fixture: &Fixture, date: chrono::NaiveDate) -> DataOrchestrator {
    let session = Session::with_settings(date, school(), OverrideTimetable::new());
    DataOrchestrator::new(fixture.sources(), session)
}

#[tokio::test]
async fn fixed_holiday_loads_weather_only() {
    let fixture = Fixture::new(d(2025, 10, 6));
    let orchestrator = orchestrator(&fixture, d(2025, 10, 9));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert_eq!(
        briefing.classification,
        DayClassification::PublicHoliday {
            label: "한글날".to_string()
        }
    );
    assert!(briefing.menu.is_none());
    assert!(briefing.schedule.is_none());
    let weather = briefing.weather.unwrap();
    assert_eq!(weather.temperature_max, 13.0);
    assert_eq!(weather.condition_code, 3);

    assert_eq!(fixture.geocoder.calls(), 1);
    assert_eq!(fixture.forecast.calls(), 1);
    assert_eq!(fixture.meals.calls(), 0);
    assert_eq!(fixture.timetable.calls(), 0);
}

#[tokio::test]
async fn weekend_skips_menu_and_schedule() {
    let fixture = Fixture::new(d(2025, 3, 10));
    let orchestrator = orchestrator(&fixture, d(2025, 3, 15));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert_eq!(briefing.classification, DayClassification::Weekend);
    assert!(briefing.weather.is_some());
    assert!(briefing.menu.is_none());
    assert!(briefing.schedule.is_none());
    assert_eq!(fixture.meals.calls(), 0);
    assert_eq!(fixture.timetable.calls(), 0);
}

#[tokio::test]
async fn regular_day_loads_every_source() {
    let fixture = Fixture::new(d(2025, 3, 10));
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert_eq!(briefing.classification, DayClassification::RegularDay);

    let weather = briefing.weather.unwrap();
    assert_eq!(weather.temperature_max, 12.0);
    assert_eq!(weather.temperature_min, 0.0);
    assert_eq!(weather.condition_code, 61);
    assert_eq!(weather.precipitation_probability, 60);

    assert_eq!(
        briefing.menu.unwrap().dishes,
        vec!["현미밥", "된장국", "불고기"]
    );
    assert_eq!(
        briefing.schedule.unwrap(),
        vec![
            ScheduleSlot::new(1, "국어"),
            ScheduleSlot::new(2, "수학"),
            ScheduleSlot::new(3, "체육"),
        ]
    );

    assert_eq!(fixture.geocoder.queries(), vec!["서울특별시"]);
    assert_eq!(fixture.forecast.queries(), vec!["37.566,126.9784/7"]);
    assert_eq!(fixture.meals.queries(), vec!["B10/7011234/20250312"]);
    assert_eq!(
        fixture.timetable.queries(),
        vec!["B10/7011234/2025/1/20250312/3/2"]
    );
}

#[tokio::test]
async fn second_semester_is_sent_from_september() {
    let fixture = Fixture::new(d(2025, 3, 10));
    let orchestrator = orchestrator(&fixture, d(2025, 9, 1));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert!(briefing.weather.is_none());
    assert_eq!(
        fixture.timetable.queries(),
        vec!["B10/7011234/2025/2/20250901/3/2"]
    );
}

#[tokio::test]
async fn failing_menu_leaves_other_sources_intact() {
    let fixture = Fixture::new(d(2025, 3, 10));
    fixture.meals.set(Outcome::Fail);
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert_eq!(briefing.menu, Some(MenuEntry::empty()));
    assert_eq!(briefing.schedule.unwrap().len(), 3);
    assert!(briefing.weather.is_some());
}

#[tokio::test]
async fn failing_forecast_only_clears_weather() {
    let fixture = Fixture::new(d(2025, 3, 10));
    fixture.forecast.set(Outcome::Fail);
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert!(briefing.weather.is_none());
    assert_eq!(briefing.menu.unwrap().dishes.len(), 3);
    assert_eq!(briefing.schedule.unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_region_skips_forecast() {
    let fixture = Fixture::new(d(2025, 3, 10));
    fixture.geocoder.set(Outcome::Value(None));
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert!(briefing.weather.is_none());
    assert_eq!(fixture.forecast.calls(), 0);
}

#[tokio::test]
async fn failing_timetable_yields_empty_schedule() {
    let fixture = Fixture::new(d(2025, 3, 10));
    fixture.timetable.set(Outcome::Fail);
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert_eq!(briefing.schedule, Some(Vec::new()));
    assert_eq!(briefing.menu.unwrap().dishes.len(), 3);
}

#[tokio::test]
async fn empty_provider_answers_are_not_errors() {
    let fixture = Fixture::new(d(2025, 3, 10));
    fixture.meals.set(Outcome::Value(None));
    fixture.timetable.set(Outcome::Value(None));
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert_eq!(briefing.menu, Some(MenuEntry::empty()));
    assert_eq!(briefing.schedule, Some(Vec::new()));
    assert_eq!(briefing.headline().as_deref(), Some("정보 없음"));
}

#[tokio::test]
async fn aborted_school_day_clears_menu_and_schedule() {
    let fixture = Fixture::new(d(2025, 3, 10));
    fixture.timetable.set(Outcome::Panic);
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert!(briefing.weather.is_some());
    assert!(briefing.menu.is_none());
    assert!(briefing.schedule.is_none());
}

#[tokio::test]
async fn override_replaces_remote_timetable() {
    let fixture = Fixture::new(d(2025, 3, 10));
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));
    let mut overrides = OverrideTimetable::new();
    overrides.set_day(Weekday::Wed, ["과학", "", "음악"]);

    let briefing = orchestrator
        .dispatch(SessionEvent::OverrideChanged(overrides))
        .await
        .unwrap();

    assert_eq!(fixture.timetable.calls(), 0);
    assert_eq!(fixture.meals.calls(), 1);
    assert_eq!(
        briefing.schedule.unwrap(),
        vec![
            ScheduleSlot::new(1, "과학"),
            ScheduleSlot::new(2, ""),
            ScheduleSlot::new(3, "음악"),
        ]
    );
}

#[tokio::test]
async fn incomplete_school_stays_idle() {
    let fixture = Fixture::new(d(2025, 3, 10));
    let orchestrator = DataOrchestrator::new(fixture.sources(), Session::new(d(2025, 3, 12)));

    assert!(orchestrator.dispatch(SessionEvent::Refresh).await.is_none());

    let session = orchestrator.session();
    assert_eq!(session.state(), LoadState::Idle);
    assert!(session.briefing().is_none());
    assert_eq!(fixture.geocoder.calls(), 0);
    assert_eq!(fixture.meals.calls(), 0);

    let briefing = orchestrator
        .dispatch(SessionEvent::SchoolChanged(school()))
        .await;
    assert!(briefing.is_some());
    assert_eq!(orchestrator.session().state(), LoadState::Idle);
}

#[tokio::test]
async fn shifting_days_moves_the_session_date() {
    let fixture = Fixture::new(d(2025, 3, 10));
    let orchestrator = orchestrator(&fixture, d(2025, 3, 14));

    let briefing = orchestrator
        .dispatch(SessionEvent::ShiftDays(1))
        .await
        .unwrap();
    assert_eq!(briefing.date, d(2025, 3, 15));
    assert_eq!(briefing.classification, DayClassification::Weekend);

    let briefing = orchestrator
        .dispatch(SessionEvent::ShiftDays(-5))
        .await
        .unwrap();
    assert_eq!(briefing.date, d(2025, 3, 10));

    let briefing = orchestrator
        .dispatch(SessionEvent::Today(d(2025, 3, 12)))
        .await
        .unwrap();
    assert_eq!(orchestrator.session().date(), d(2025, 3, 12));
    assert_eq!(briefing.date, d(2025, 3, 12));
}

#[test]
fn session_rejects_superseded_commits() {
    let mut session = Session::with_settings(d(2025, 3, 12), school(), OverrideTimetable::new());
    let calendar = SchoolCalendar::default();

    let first = session
        .dispatch(SessionEvent::DateChanged(d(2025, 3, 11)))
        .unwrap();
    let second = session
        .dispatch(SessionEvent::DateChanged(d(2025, 3, 13)))
        .unwrap();
    assert!(second.generation > first.generation);
    assert_eq!(session.state(), LoadState::Loading);

    let stale = school_briefing::DailyBriefing::new(
        first.request.date,
        calendar.classify(first.request.date),
    );
    assert!(!session.commit(first.generation, stale));
    assert!(session.briefing().is_none());

    let fresh = school_briefing::DailyBriefing::new(
        second.request.date,
        calendar.classify(second.request.date),
    );
    assert!(session.commit(second.generation, fresh));
    assert_eq!(session.briefing().unwrap().date, d(2025, 3, 13));
    assert_eq!(session.state(), LoadState::Idle);
}

/// Holds the first lookup until released so a newer event can overtake it.
struct GatedGeocoder {
    gate: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl Geocoder for GatedGeocoder {
    async fn locate(&self, _region_name: &str) -> ProviderResult<Option<Coordinates>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.gate.notified().await;
        }
        Ok(Some(Coordinates {
            latitude: 37.5,
            longitude: 127.0,
        }))
    }
}

#[tokio::test]
async fn slow_load_never_overwrites_newer_result() {
    school_briefing::logging::init_test();
    let fixture = Fixture::new(d(2025, 3, 10));
    let gated = Arc::new(GatedGeocoder {
        gate: Notify::new(),
        calls: AtomicUsize::new(0),
    });
    let mut sources = fixture.sources();
    sources.geocoder = gated.clone() as Arc<dyn Geocoder>;
    let session = Session::with_settings(d(2025, 3, 10), school(), OverrideTimetable::new());
    let orchestrator = DataOrchestrator::new(sources, session);

    let slow = orchestrator.dispatch(SessionEvent::DateChanged(d(2025, 3, 11)));
    let fast = async {
        while gated.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        let result = orchestrator
            .dispatch(SessionEvent::DateChanged(d(2025, 3, 12)))
            .await;
        gated.gate.notify_one();
        result
    };

    let (slow, fast) = tokio::join!(slow, fast);

    assert!(slow.is_none());
    assert_eq!(fast.unwrap().date, d(2025, 3, 12));
    let committed = orchestrator.briefing().unwrap();
    assert_eq!(committed.date, d(2025, 3, 12));
    assert_eq!(committed.weather.unwrap().condition_code, 61);
    assert_eq!(gated.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn load_briefing_without_region_name_has_no_weather() {
    let fixture = Fixture::new(d(2025, 3, 10));
    let mut request = orchestrator(&fixture, d(2025, 3, 12)).session().request();
    request.school.region_name = "  ".to_string();

    let briefing = load_briefing(&fixture.sources(), &SchoolCalendar::default(), &request, 7).await;

    assert!(briefing.weather.is_none());
    assert_eq!(fixture.geocoder.calls(), 0);
    assert_eq!(fixture.meals.calls(), 1);
}

#[tokio::test]
async fn settings_survive_a_restart() {
    let fixture = Fixture::new(d(2025, 3, 10));
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));
    let mut overrides = OverrideTimetable::new();
    overrides.set_period(Weekday::Thu, 2, "도덕");
    orchestrator
        .dispatch(SessionEvent::OverrideChanged(overrides.clone()))
        .await;

    let store = MemorySettingsStore::new();
    orchestrator.save_settings(&store).unwrap();

    let restored = Session::restore(&store, d(2025, 3, 13)).unwrap();
    assert_eq!(restored.school(), &school());
    assert_eq!(restored.overrides(), &overrides);
    assert_eq!(restored.date(), d(2025, 3, 13));
    assert_eq!(restored.state(), LoadState::Idle);
}

#[tokio::test]
async fn restore_from_empty_store_is_unconfigured() {
    let store = MemorySettingsStore::new();
    let session = Session::restore(&store, d(2025, 3, 12)).unwrap();
    assert!(!session.school().is_complete());
    assert!(session.overrides().is_empty());
}

#[tokio::test]
async fn school_search_ignores_blank_queries_and_failures() {
    let fixture = Fixture::new(d(2025, 3, 10));

    let found = search_schools(&*fixture.directory, " 한빛 ").await;
    assert_eq!(found, vec![school()]);
    assert_eq!(fixture.directory.queries(), vec!["한빛"]);

    assert!(search_schools(&*fixture.directory, "   ").await.is_empty());
    assert_eq!(fixture.directory.calls(), 1);

    fixture.directory.set(Outcome::Fail);
    assert!(search_schools(&*fixture.directory, "한빛").await.is_empty());
}

#[tokio::test]
async fn panicking_geocoder_only_clears_weather() {
    let fixture = Fixture::new(d(2025, 3, 10));
    fixture.geocoder.set(Outcome::Panic);
    let orchestrator = orchestrator(&fixture, d(2025, 3, 12));

    let briefing = orchestrator.dispatch(SessionEvent::Refresh).await.unwrap();

    assert!(briefing.weather.is_none());
    assert_eq!(fixture.forecast.calls(), 0);
    assert_eq!(briefing.menu.unwrap().dishes.len(), 3);
    assert_eq!(briefing.schedule.unwrap().len(), 3);
    assert_eq!(orchestrator.session().state(), LoadState::Idle);
}

/// Never answers, so a load stays in flight until its future is dropped.
struct StalledGeocoder;

#[async_trait]
impl Geocoder for StalledGeocoder {
    async fn locate(&self, _region_name: &str) -> ProviderResult<Option<Coordinates>> {
        futures::future::pending().await
    }
}

#[tokio::test]
async fn dropped_load_returns_session_to_idle() {
    let fixture = Fixture::new(d(2025, 3, 10));
    let mut sources = fixture.sources();
    sources.geocoder = Arc::new(StalledGeocoder) as Arc<dyn Geocoder>;
    let session = Session::with_settings(d(2025, 3, 12), school(), OverrideTimetable::new());
    let orchestrator = DataOrchestrator::new(sources, session);

    let outcome = orchestrator
        .dispatch(SessionEvent::Refresh)
        .now_or_never();
    assert!(outcome.is_none());

    let session = orchestrator.session();
    assert_eq!(session.state(), LoadState::Idle);
    assert_eq!(session.generation(), 1);
    assert!(session.briefing().is_none());
    assert_eq!(fixture.meals.calls(), 0);
}

#[test]
fn abandon_only_applies_to_the_current_load() {
    let mut session = Session::with_settings(d(2025, 3, 12), school(), OverrideTimetable::new());
    let first = session.dispatch(SessionEvent::Refresh).unwrap();
    let second = session.dispatch(SessionEvent::Refresh).unwrap();

    assert!(!session.abandon(first.generation));
    assert_eq!(session.state(), LoadState::Loading);

    assert!(session.abandon(second.generation));
    assert_eq!(session.state(), LoadState::Idle);
    assert!(!session.abandon(second.generation));
}
