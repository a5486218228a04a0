use crate::holidays::{self, HolidayTable};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayClassification {
    RegularDay,
    Weekend,
    PublicHoliday { label: String },
}

impl DayClassification {
    pub fn is_regular_day(&self) -> bool {
        matches!(self, DayClassification::RegularDay)
    }

    pub fn holiday_label(&self) -> Option<&str> {
        match self {
            DayClassification::PublicHoliday { label } => Some(label),
            _ => None,
        }
    }
}

impl fmt::Display for DayClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayClassification::RegularDay => write!(f, "regular day"),
            DayClassification::Weekend => write!(f, "weekend"),
            DayClassification::PublicHoliday { label } => write!(f, "public holiday ({label})"),
        }
    }
}

/// Korean school calendar: fixed holidays, the lunar holiday table and the
/// Saturday/Sunday weekend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchoolCalendar {
    table: HolidayTable,
}

impl SchoolCalendar {
    pub fn new(table: HolidayTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &HolidayTable {
        &self.table
    }

    /// Classify a date. First match wins: fixed holidays, then the lunar
    /// table for the date's year, then the weekend check.
    pub fn classify(&self, date: NaiveDate) -> DayClassification {
        let (month, day) = (date.month(), date.day());

        if let Some(entry) = holidays::find_fixed(month, day) {
            return DayClassification::PublicHoliday {
                label: entry.label.to_string(),
            };
        }

        if let Some(entry) = self.table.find(date.year(), month, day) {
            return DayClassification::PublicHoliday {
                label: entry.label.to_string(),
            };
        }

        if is_weekend(date) {
            return DayClassification::Weekend;
        }

        DayClassification::RegularDay
    }

    pub fn is_school_day(&self, date: NaiveDate) -> bool {
        self.classify(date).is_regular_day()
    }

    /// Find the next school day after a given date, or `None` past the end
    /// of the representable range
    pub fn next_school_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.succ_opt()?;
        while !self.is_school_day(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    /// Find the previous school day before a given date
    pub fn prev_school_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.pred_opt()?;
        while !self.is_school_day(current) {
            current = current.pred_opt()?;
        }
        Some(current)
    }

    /// Get all school days in a date range (inclusive)
    pub fn school_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = Some(start);

        while let Some(date) = current.filter(|date| *date <= end) {
            if self.is_school_day(date) {
                days.push(date);
            }
            current = date.succ_opt();
        }
        days
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Semester 1 covers March through July; everything else is semester 2.
pub fn semester(month: u32) -> u8 {
    if (3..=7).contains(&month) { 1 } else { 2 }
}

/// Single-syllable Korean weekday name, used as the override timetable key.
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "일",
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
    }
}

pub fn weekday_from_label(label: &str) -> Option<Weekday> {
    match label {
        "일" => Some(Weekday::Sun),
        "월" => Some(Weekday::Mon),
        "화" => Some(Weekday::Tue),
        "수" => Some(Weekday::Wed),
        "목" => Some(Weekday::Thu),
        "금" => Some(Weekday::Fri),
        "토" => Some(Weekday::Sat),
        _ => None,
    }
}

/// `YYYY-MM-DD`, the forecast provider's date format.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYYMMDD`, the education data provider's date format.
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
