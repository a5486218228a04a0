use serde::Serialize;
use std::ops::RangeInclusive;

/// A public holiday pinned to a solar (month, day) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HolidayEntry {
    pub month: u32,
    pub day: u32,
    pub label: &'static str,
}

impl HolidayEntry {
    const fn new(month: u32, day: u32, label: &'static str) -> Self {
        Self { month, day, label }
    }

    pub fn matches(&self, month: u32, day: u32) -> bool {
        self.month == month && self.day == day
    }
}

/// Holidays observed on the same solar date every year.
///
/// The Children's Day substitute on 5/6 is the 2024 alignment (5/5 fell on a
/// Sunday) applied to every year. It is a fixed approximation of the
/// substitute rule, not a derivation of it.
pub const FIXED_HOLIDAYS: &[HolidayEntry] = &[
    HolidayEntry::new(1, 1, "신정"),
    HolidayEntry::new(3, 1, "삼일절"),
    HolidayEntry::new(5, 5, "어린이날"),
    HolidayEntry::new(5, 6, "대체 공휴일 (어린이날)"),
    HolidayEntry::new(6, 6, "현충일"),
    HolidayEntry::new(8, 15, "광복절"),
    HolidayEntry::new(10, 3, "개천절"),
    HolidayEntry::new(10, 9, "한글날"),
    HolidayEntry::new(12, 25, "성탄절"),
];

const LUNAR_2024: &[HolidayEntry] = &[
    HolidayEntry::new(2, 9, "설날 연휴"),
    HolidayEntry::new(2, 10, "설날"),
    HolidayEntry::new(2, 11, "설날 연휴"),
    HolidayEntry::new(5, 15, "부처님 오신 날"),
    HolidayEntry::new(9, 16, "추석 연휴"),
    HolidayEntry::new(9, 17, "추석"),
    HolidayEntry::new(9, 18, "추석 연휴"),
];

const LUNAR_2025: &[HolidayEntry] = &[
    HolidayEntry::new(1, 28, "설날 연휴"),
    HolidayEntry::new(1, 29, "설날"),
    HolidayEntry::new(1, 30, "설날 연휴"),
    HolidayEntry::new(6, 1, "부처님 오신 날"),
    // 6/1 is a Sunday
    HolidayEntry::new(6, 2, "대체 공휴일 (부처님 오신 날)"),
    HolidayEntry::new(10, 5, "추석 연휴"),
    HolidayEntry::new(10, 6, "추석"),
    HolidayEntry::new(10, 7, "추석 연휴"),
    // 10/5 is a Sunday
    HolidayEntry::new(10, 8, "대체 공휴일 (추석)"),
];

const LUNAR_2026: &[HolidayEntry] = &[
    HolidayEntry::new(2, 16, "설날 연휴"),
    HolidayEntry::new(2, 17, "설날"),
    HolidayEntry::new(2, 18, "설날 연휴"),
    HolidayEntry::new(5, 25, "부처님 오신 날"),
    HolidayEntry::new(9, 25, "추석 연휴"),
    HolidayEntry::new(9, 26, "추석"),
    HolidayEntry::new(9, 27, "추석 연휴"),
    // 9/26 is a Saturday
    HolidayEntry::new(9, 28, "대체 공휴일 (추석)"),
];

const LUNAR_2027: &[HolidayEntry] = &[
    HolidayEntry::new(2, 8, "설날 연휴"),
    HolidayEntry::new(2, 9, "설날"),
    HolidayEntry::new(2, 10, "설날 연휴"),
    HolidayEntry::new(5, 15, "부처님 오신 날"),
    // 5/15 is a Saturday
    HolidayEntry::new(5, 17, "대체 공휴일 (부처님 오신 날)"),
    HolidayEntry::new(9, 15, "추석 연휴"),
    HolidayEntry::new(9, 16, "추석"),
    HolidayEntry::new(9, 17, "추석 연휴"),
];

const LUNAR_2028: &[HolidayEntry] = &[
    HolidayEntry::new(1, 25, "설날 연휴"),
    HolidayEntry::new(1, 26, "설날"),
    HolidayEntry::new(1, 27, "설날 연휴"),
    HolidayEntry::new(5, 12, "부처님 오신 날"),
    HolidayEntry::new(10, 2, "추석 연휴"),
    // Shadowed by 개천절 in the fixed list
    HolidayEntry::new(10, 3, "추석 (개천절 중복)"),
    HolidayEntry::new(10, 4, "추석 연휴"),
    HolidayEntry::new(10, 5, "대체 공휴일 (추석)"),
];

/// Precomputed solar dates of the lunar holidays (Seollal, Buddha's Birthday,
/// Chuseok) and their substitute holidays.
///
/// Only years in [`HolidayTable::SUPPORTED_YEARS`] carry data. Any other year
/// yields an empty slice rather than an extrapolated guess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HolidayTable;

impl HolidayTable {
    pub const SUPPORTED_YEARS: RangeInclusive<i32> = 2024..=2028;

    pub fn entries_for(&self, year: i32) -> &'static [HolidayEntry] {
        match year {
            2024 => LUNAR_2024,
            2025 => LUNAR_2025,
            2026 => LUNAR_2026,
            2027 => LUNAR_2027,
            2028 => LUNAR_2028,
            _ => &[],
        }
    }

    pub fn covers(&self, year: i32) -> bool {
        Self::SUPPORTED_YEARS.contains(&year)
    }

    /// Look up the lunar-derived holiday label for a (year, month, day).
    ///
    /// Entries that fall on a fixed holiday are still returned here, but
    /// [`crate::SchoolCalendar::classify`] reports the fixed label for them.
    pub fn find(&self, year: i32, month: u32, day: u32) -> Option<&'static HolidayEntry> {
        self.entries_for(year)
            .iter()
            .find(|entry| entry.matches(month, day))
    }
}

pub fn find_fixed(month: u32, day: u32) -> Option<&'static HolidayEntry> {
    FIXED_HOLIDAYS.iter().find(|entry| entry.matches(month, day))
}
