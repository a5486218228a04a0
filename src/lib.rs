pub mod briefing;
pub mod calendar;
pub mod config;
pub mod holidays;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod menu;
pub mod orchestrator;
pub mod persistence;
pub mod providers;
pub mod school;
pub mod timetable;
pub mod weather;

pub use briefing::DailyBriefing;
pub use calendar::{DayClassification, SchoolCalendar, semester};
pub use config::{ClientConfig, ConfigError};
pub use holidays::{HolidayEntry, HolidayTable};
pub use menu::{MealRow, MenuEntry};
pub use orchestrator::{
    BriefingRequest, DataOrchestrator, LoadState, Session, SessionEvent, Sources, load_briefing,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteSettingsStore;
pub use persistence::{
    JsonFileSettingsStore, MemorySettingsStore, PersistenceError, SettingsStore,
};
pub use providers::{ProviderError, ProviderResult};
pub use school::{SchoolIdentity, SchoolLevel};
pub use timetable::{OverrideTimetable, ScheduleSlot, TimetableRow};
pub use weather::{WeatherCondition, WeatherSnapshot};
