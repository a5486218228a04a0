use crate::school::SchoolIdentity;
use crate::timetable::OverrideTimetable;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

pub const SCHOOL_INFO_KEY: &str = "schoolInfo";
pub const OVERRIDE_TIMETABLE_KEY: &str = "customTimetable";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Opaque string key/value store for user settings.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PersistenceResult<()>;
}

fn load_json<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> PersistenceResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

fn save_json<T: Serialize>(store: &dyn SettingsStore, key: &str, value: &T) -> PersistenceResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

pub fn load_school(store: &dyn SettingsStore) -> PersistenceResult<Option<SchoolIdentity>> {
    load_json(store, SCHOOL_INFO_KEY)
}

pub fn save_school(store: &dyn SettingsStore, school: &SchoolIdentity) -> PersistenceResult<()> {
    save_json(store, SCHOOL_INFO_KEY, school)
}

pub fn load_overrides(store: &dyn SettingsStore) -> PersistenceResult<Option<OverrideTimetable>> {
    load_json(store, OVERRIDE_TIMETABLE_KEY)
}

pub fn save_overrides(
    store: &dyn SettingsStore,
    overrides: &OverrideTimetable,
) -> PersistenceResult<()> {
    save_json(store, OVERRIDE_TIMETABLE_KEY, overrides)
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::JsonFileSettingsStore;
pub use memory::MemorySettingsStore;
