use crate::calendar::weekday_label;
use crate::providers::ProviderResult;
use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use tracing::{debug, warn};

/// Minimum number of period rows offered when editing an override.
pub const MIN_EDITABLE_PERIODS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub period: u32,
    pub subject: String,
}

impl ScheduleSlot {
    pub fn new(period: u32, subject: impl Into<String>) -> Self {
        Self {
            period,
            subject: subject.into(),
        }
    }
}

/// One row from the remote timetable provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableRow {
    #[serde(rename = "PERIO", default, deserialize_with = "text_or_number")]
    pub period: String,
    #[serde(rename = "ITRT_CNTNT", default, deserialize_with = "text_or_number")]
    pub subject: String,
}

impl TimetableRow {
    pub fn new(period: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            subject: subject.into(),
        }
    }
}

// The provider is inconsistent about quoting numeric columns.
fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// User-authored timetable keyed by Korean weekday name (`"월"`, `"화"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTimetable(BTreeMap<String, Vec<String>>);

impl OverrideTimetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, weekday: Weekday) -> Option<&[String]> {
        self.0.get(weekday_label(weekday)).map(Vec::as_slice)
    }

    pub fn set_day<I, S>(&mut self, weekday: Weekday, subjects: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(
            weekday_label(weekday).to_string(),
            subjects.into_iter().map(Into::into).collect(),
        );
    }

    /// Set one period (1-based), padding earlier periods with empty strings.
    pub fn set_period(&mut self, weekday: Weekday, period: usize, subject: impl Into<String>) {
        if period == 0 {
            return;
        }
        let day = self.0.entry(weekday_label(weekday).to_string()).or_default();
        if day.len() < period {
            day.resize(period, String::new());
        }
        day[period - 1] = subject.into();
    }

    /// True when the weekday has at least one non-empty subject.
    pub fn covers(&self, weekday: Weekday) -> bool {
        self.day(weekday)
            .is_some_and(|subjects| subjects.iter().any(|subject| !subject.is_empty()))
    }

    /// Number of period rows to show in an editor.
    pub fn row_count(&self) -> usize {
        self.0
            .values()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(MIN_EDITABLE_PERIODS)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolve the day's schedule.
///
/// A weekday with any non-empty override entry is served entirely from the
/// override and `remote` is never called; otherwise the remote rows are
/// normalised. The two sources are never merged.
pub async fn resolve<F, Fut>(
    weekday: Weekday,
    overrides: &OverrideTimetable,
    remote: F,
) -> ProviderResult<Vec<ScheduleSlot>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ProviderResult<Option<Vec<TimetableRow>>>>,
{
    if let Some(subjects) = overrides.day(weekday).filter(|_| overrides.covers(weekday)) {
        debug!(weekday = weekday_label(weekday), "using override timetable");
        return Ok(from_override(subjects));
    }

    let rows = remote().await?;
    Ok(rows.map(|rows| normalize_rows(&rows)).unwrap_or_default())
}

fn from_override(subjects: &[String]) -> Vec<ScheduleSlot> {
    subjects
        .iter()
        .enumerate()
        .map(|(index, subject)| ScheduleSlot::new(index as u32 + 1, subject.clone()))
        .collect()
}

pub fn normalize_rows(rows: &[TimetableRow]) -> Vec<ScheduleSlot> {
    rows.iter()
        .filter_map(|row| match row.period.trim().parse::<u32>() {
            Ok(period) if period > 0 => Some(ScheduleSlot::new(period, row.subject.trim())),
            _ => {
                warn!(period = %row.period, "dropping timetable row with invalid period");
                None
            }
        })
        .collect()
}
