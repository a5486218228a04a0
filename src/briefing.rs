use crate::calendar::DayClassification;
use crate::menu::MenuEntry;
use crate::timetable::ScheduleSlot;
use crate::weather::{NO_INFORMATION, WeatherSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything shown for one (date, school) pair.
///
/// `menu` and `schedule` are `None` when they do not apply (weekend or
/// holiday) and `Some` but empty when the day applies and nothing was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBriefing {
    pub date: NaiveDate,
    pub classification: DayClassification,
    pub weather: Option<WeatherSnapshot>,
    pub menu: Option<MenuEntry>,
    pub schedule: Option<Vec<ScheduleSlot>>,
}

impl DailyBriefing {
    pub fn new(date: NaiveDate, classification: DayClassification) -> Self {
        Self {
            date,
            classification,
            weather: None,
            menu: None,
            schedule: None,
        }
    }

    /// True when the menu or schedule carries anything to show.
    pub fn has_school_data(&self) -> bool {
        self.menu.as_ref().is_some_and(|menu| !menu.is_empty())
            || self.schedule.as_ref().is_some_and(|slots| !slots.is_empty())
    }

    /// Banner for days without regular content; `None` on a regular day
    /// that has data.
    pub fn headline(&self) -> Option<String> {
        match &self.classification {
            DayClassification::PublicHoliday { label } => Some(format!("공휴일 ({label})")),
            DayClassification::Weekend => Some("휴일 (토/일요일)".to_string()),
            DayClassification::RegularDay if !self.has_school_data() => {
                Some(NO_INFORMATION.to_string())
            }
            DayClassification::RegularDay => None,
        }
    }

    /// Plain-text summary for pasting into a group chat.
    pub fn share_text(&self) -> String {
        let weather = self
            .weather
            .as_ref()
            .map(WeatherSnapshot::temperature_text)
            .unwrap_or_else(|| NO_INFORMATION.to_string());

        let menu = self
            .menu
            .as_ref()
            .filter(|menu| !menu.is_empty())
            .map(|menu| menu.dishes.join(", "))
            .unwrap_or_else(|| NO_INFORMATION.to_string());

        let schedule = self
            .schedule
            .as_ref()
            .filter(|slots| !slots.is_empty())
            .map(|slots| {
                slots
                    .iter()
                    .filter(|slot| !slot.subject.is_empty())
                    .map(|slot| slot.subject.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_else(|| NO_INFORMATION.to_string());

        format!("날씨: {weather}\n\n급식메뉴: {menu}\n\n시간표: {schedule}")
    }
}
