use crate::calendar::iso_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const NO_INFORMATION: &str = "정보 없음";

const RAIN_CODES: [i32; 9] = [51, 53, 55, 61, 63, 65, 80, 81, 82];
const SNOW_CODES: [i32; 5] = [71, 73, 75, 85, 86];

/// Coarse grouping of WMO weather codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Clear,
    Cloudy,
    Fog,
    Rain,
    FreezingRain,
    Snow,
    Thunderstorm,
    Unknown,
}

/// WMO weather interpretation codes, as reported by the forecast provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    SnowGrains,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    ThunderstormWithHail,
    Unknown,
}

impl WeatherCondition {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => WeatherCondition::Clear,
            1 => WeatherCondition::MainlyClear,
            2 => WeatherCondition::PartlyCloudy,
            3 => WeatherCondition::Overcast,
            45 | 48 => WeatherCondition::Fog,
            51 | 53 | 55 => WeatherCondition::Drizzle,
            56 | 57 => WeatherCondition::FreezingDrizzle,
            61 | 63 | 65 => WeatherCondition::Rain,
            66 | 67 => WeatherCondition::FreezingRain,
            71 | 73 | 75 => WeatherCondition::Snow,
            77 => WeatherCondition::SnowGrains,
            80..=82 => WeatherCondition::RainShowers,
            85 | 86 => WeatherCondition::SnowShowers,
            95 => WeatherCondition::Thunderstorm,
            96 | 99 => WeatherCondition::ThunderstormWithHail,
            _ => WeatherCondition::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "맑음",
            WeatherCondition::MainlyClear => "주로 맑음",
            WeatherCondition::PartlyCloudy => "부분적으로 흐림",
            WeatherCondition::Overcast => "흐림",
            WeatherCondition::Fog => "안개",
            WeatherCondition::Drizzle => "이슬비",
            WeatherCondition::FreezingDrizzle => "어는 이슬비",
            WeatherCondition::Rain => "비",
            WeatherCondition::FreezingRain => "어는 비",
            WeatherCondition::Snow => "눈",
            WeatherCondition::SnowGrains => "눈송이",
            WeatherCondition::RainShowers => "소나기",
            WeatherCondition::SnowShowers => "눈 소나기",
            WeatherCondition::Thunderstorm => "천둥 번개",
            WeatherCondition::ThunderstormWithHail => "우박을 동반한 천둥 번개",
            WeatherCondition::Unknown => NO_INFORMATION,
        }
    }

    pub fn category(self) -> WeatherCategory {
        match self {
            WeatherCondition::Clear | WeatherCondition::MainlyClear => WeatherCategory::Clear,
            WeatherCondition::PartlyCloudy | WeatherCondition::Overcast => WeatherCategory::Cloudy,
            WeatherCondition::Fog => WeatherCategory::Fog,
            WeatherCondition::Drizzle | WeatherCondition::Rain | WeatherCondition::RainShowers => {
                WeatherCategory::Rain
            }
            WeatherCondition::FreezingDrizzle | WeatherCondition::FreezingRain => {
                WeatherCategory::FreezingRain
            }
            WeatherCondition::Snow | WeatherCondition::SnowGrains | WeatherCondition::SnowShowers => {
                WeatherCategory::Snow
            }
            WeatherCondition::Thunderstorm | WeatherCondition::ThunderstormWithHail => {
                WeatherCategory::Thunderstorm
            }
            WeatherCondition::Unknown => WeatherCategory::Unknown,
        }
    }
}

/// Korean label for a WMO code. Unknown codes map to "정보 없음".
pub fn describe(code: i32) -> &'static str {
    WeatherCondition::from_code(code).label()
}

pub fn is_rain(code: i32) -> bool {
    RAIN_CODES.contains(&code)
}

pub fn is_snow(code: i32) -> bool {
    SNOW_CODES.contains(&code)
}

/// Forecast for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub condition_code: i32,
    /// Percentage, 0–100.
    pub precipitation_probability: u8,
}

impl WeatherSnapshot {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.condition_code)
    }

    pub fn label(&self) -> &'static str {
        describe(self.condition_code)
    }

    /// Precipitation note shown next to the label: `(비, 40%)` or `(눈)`.
    pub fn annotation(&self) -> Option<String> {
        if is_rain(self.condition_code) && self.precipitation_probability > 0 {
            return Some(format!("(비, {}%)", self.precipitation_probability));
        }
        if is_snow(self.condition_code) {
            return Some("(눈)".to_string());
        }
        None
    }

    /// `max°/min°`, rounded half-up.
    pub fn temperature_text(&self) -> String {
        format!(
            "{}°/{}°",
            round_half_up(self.temperature_max),
            round_half_up(self.temperature_min)
        )
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Multi-day forecast as parallel per-day series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
}

impl DailyForecast {
    /// Pick the day whose date string starts with the target's `YYYY-MM-DD`.
    ///
    /// Returns `None` when the date is outside the forecast horizon or the
    /// series are missing values for that day.
    pub fn select_day(&self, date: NaiveDate) -> Option<WeatherSnapshot> {
        let target = iso_date(date);
        let index = self.time.iter().position(|time| time.starts_with(&target))?;

        let temperature_max = self.temperature_2m_max.get(index).copied().flatten()?;
        let temperature_min = self.temperature_2m_min.get(index).copied().flatten()?;
        let condition_code = self.weather_code.get(index).copied().flatten()?;
        let probability = self
            .precipitation_probability_max
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(0.0);

        Some(WeatherSnapshot {
            temperature_max,
            temperature_min,
            condition_code,
            precipitation_probability: probability.round().clamp(0.0, 100.0) as u8,
        })
    }
}
