#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use school_briefing::providers::{
    ForecastProvider, Geocoder, MealProvider, MealQuery, ProviderError, ProviderResult,
    SchoolDirectory, TimetableProvider, TimetableQuery,
};
use school_briefing::weather::{Coordinates, DailyForecast};
use school_briefing::{MealRow, SchoolIdentity, SchoolLevel, Sources, TimetableRow};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn school() -> SchoolIdentity {
    SchoolIdentity::new("한빛초등학교", "7011234", "B10", "서울특별시")
        .with_class("3", "2")
        .with_level(SchoolLevel::Elementary)
}

/// Seven days starting at `start`; day `i` has max `10 + i`, min `i - 2`.
pub fn week_forecast(start: NaiveDate) -> DailyForecast {
    let codes = [0, 1, 61, 3, 71, 80, 95];
    let probabilities = [0.0, 10.0, 60.0, 0.0, 30.0, 0.0, 90.0];
    let mut forecast = DailyForecast::default();
    for i in 0..7 {
        let date = start + Duration::days(i as i64);
        forecast.time.push(date.format("%Y-%m-%d").to_string());
        forecast.temperature_2m_max.push(Some(10.0 + i as f64));
        forecast.temperature_2m_min.push(Some(i as f64 - 2.0));
        forecast.weather_code.push(Some(codes[i]));
        forecast.precipitation_probability_max.push(Some(probabilities[i]));
    }
    forecast
}

pub fn meal_rows() -> Vec<MealRow> {
    vec![MealRow {
        dishes: "현미밥(5)<br/>된장국(5.6.13)<br/>불고기(10.13)".to_string(),
        meal_name: Some("중식".to_string()),
        calories: Some("650.2 Kcal".to_string()),
    }]
}

pub fn timetable_rows() -> Vec<TimetableRow> {
    vec![
        TimetableRow::new("1", "국어"),
        TimetableRow::new("2", "수학"),
        TimetableRow::new("3", "체육"),
    ]
}

#[derive(Clone)]
pub enum Outcome<T> {
    Value(T),
    Fail,
    Panic,
}

pub struct Mock<T> {
    calls: AtomicUsize,
    outcome: Mutex<Outcome<T>>,
    queries: Mutex<Vec<String>>,
}

impl<T: Clone> Mock<T> {
    pub fn new(value: T) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            outcome: Mutex::new(Outcome::Value(value)),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn set(&self, outcome: Outcome<T>) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn next(&self, what: &str, query: String) -> ProviderResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query);
        let outcome = self.outcome.lock().unwrap().clone();
        match outcome {
            Outcome::Value(value) => Ok(value),
            Outcome::Fail => Err(ProviderError::Malformed(format!("{what} is down"))),
            Outcome::Panic => panic!("{what} blew up"),
        }
    }
}

#[async_trait]
impl Geocoder for Mock<Option<Coordinates>> {
    async fn locate(&self, region_name: &str) -> ProviderResult<Option<Coordinates>> {
        self.next("geocoder", region_name.to_string())
    }
}

#[async_trait]
impl ForecastProvider for Mock<DailyForecast> {
    async fn daily_forecast(&self, at: Coordinates, days: u32) -> ProviderResult<DailyForecast> {
        self.next("forecast", format!("{},{}/{days}", at.latitude, at.longitude))
    }
}

#[async_trait]
impl MealProvider for Mock<Option<Vec<MealRow>>> {
    async fn meals(&self, query: &MealQuery) -> ProviderResult<Option<Vec<MealRow>>> {
        let described = format!("{}/{}/{}", query.region_code, query.school_code, query.date);
        self.next("meals", described)
    }
}

#[async_trait]
impl TimetableProvider for Mock<Option<Vec<TimetableRow>>> {
    async fn timetable(&self, query: &TimetableQuery) -> ProviderResult<Option<Vec<TimetableRow>>> {
        let described = format!(
            "{}/{}/{}/{}/{}/{}/{}",
            query.region_code,
            query.school_code,
            query.year,
            query.semester,
            query.date,
            query.grade,
            query.class_section
        );
        self.next("timetable", described)
    }
}

#[async_trait]
impl SchoolDirectory for Mock<Vec<SchoolIdentity>> {
    async fn search(&self, fragment: &str) -> ProviderResult<Vec<SchoolIdentity>> {
        self.next("directory", fragment.to_string())
    }
}

pub struct Fixture {
    pub geocoder: Arc<Mock<Option<Coordinates>>>,
    pub forecast: Arc<Mock<DailyForecast>>,
    pub meals: Arc<Mock<Option<Vec<MealRow>>>>,
    pub timetable: Arc<Mock<Option<Vec<TimetableRow>>>>,
    pub directory: Arc<Mock<Vec<SchoolIdentity>>>,
}

impl Fixture {
    pub fn new(forecast_start: NaiveDate) -> Self {
        Self {
            geocoder: Mock::new(Some(Coordinates {
                latitude: 37.566,
                longitude: 126.9784,
            })),
            forecast: Mock::new(week_forecast(forecast_start)),
            meals: Mock::new(Some(meal_rows())),
            timetable: Mock::new(Some(timetable_rows())),
            directory: Mock::new(vec![school()]),
        }
    }

    pub fn sources(&self) -> Sources {
        Sources {
            geocoder: self.geocoder.clone(),
            forecast: self.forecast.clone(),
            meals: self.meals.clone(),
            timetable: self.timetable.clone(),
            directory: self.directory.clone(),
        }
    }
}
