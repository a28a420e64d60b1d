//! Pure formatting helpers: weather codes, icons, temperatures, dates and
//! wind bearings. Everything here uses the en-US style and metric units.

use chrono::{DateTime, TimeZone, Timelike};
use std::fmt::Display;

pub const CELSIUS: &str = "°C";

const ICON_BASE_URL: &str = "https://basmilius.github.io/weather-icons/production/fill/all";

/// Hours used for day/night when sunrise and sunset are unknown: [6, 20).
const FALLBACK_DAY_START: u32 = 6;
const FALLBACK_DAY_END: u32 = 20;

/// Description and icon identifiers for a WMO weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCodeInfo {
    pub description: &'static str,
    pub day_icon: &'static str,
    pub night_icon: &'static str,
}

impl WeatherCodeInfo {
    const fn new(description: &'static str, day_icon: &'static str, night_icon: &'static str) -> Self {
        Self {
            description,
            day_icon,
            night_icon,
        }
    }

    const fn same(description: &'static str, icon: &'static str) -> Self {
        Self::new(description, icon, icon)
    }
}

/// Every code present in the lookup table.
/// See: https://open-meteo.com/en/docs#weathervariables
pub const KNOWN_WEATHER_CODES: [i32; 28] = [
    0, 1, 2, 3, 45, 48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82, 85,
    86, 95, 96, 99,
];

/// Look up a WMO weather code. Unknown codes get the entry for code 0.
pub fn weather_code_info(code: i32) -> WeatherCodeInfo {
    match code {
        1 => WeatherCodeInfo::new("Mainly clear", "clear-day", "clear-night"),
        2 => WeatherCodeInfo::new("Partly cloudy", "partly-cloudy-day", "partly-cloudy-night"),
        3 => WeatherCodeInfo::same("Overcast", "cloudy"),
        45 => WeatherCodeInfo::same("Foggy", "fog"),
        48 => WeatherCodeInfo::same("Depositing rime fog", "fog"),
        51 => WeatherCodeInfo::same("Light drizzle", "drizzle"),
        53 => WeatherCodeInfo::same("Moderate drizzle", "drizzle"),
        55 => WeatherCodeInfo::same("Dense drizzle", "drizzle"),
        56 => WeatherCodeInfo::same("Light freezing drizzle", "sleet"),
        57 => WeatherCodeInfo::same("Dense freezing drizzle", "sleet"),
        61 => WeatherCodeInfo::same("Slight rain", "rain"),
        63 => WeatherCodeInfo::same("Moderate rain", "rain"),
        65 => WeatherCodeInfo::same("Heavy rain", "heavy-rain"),
        66 => WeatherCodeInfo::same("Light freezing rain", "sleet"),
        67 => WeatherCodeInfo::same("Heavy freezing rain", "sleet"),
        71 => WeatherCodeInfo::same("Slight snowfall", "snow"),
        73 => WeatherCodeInfo::same("Moderate snowfall", "snow"),
        75 => WeatherCodeInfo::same("Heavy snowfall", "snow"),
        77 => WeatherCodeInfo::same("Snow grains", "snow"),
        80 => WeatherCodeInfo::same("Slight rain showers", "rain"),
        81 => WeatherCodeInfo::same("Moderate rain showers", "rain"),
        82 => WeatherCodeInfo::same("Violent rain showers", "heavy-rain"),
        85 => WeatherCodeInfo::same("Slight snow showers", "snow"),
        86 => WeatherCodeInfo::same("Heavy snow showers", "snow"),
        95 => WeatherCodeInfo::new("Thunderstorm", "thunderstorms-day", "thunderstorms-night"),
        96 => WeatherCodeInfo::new(
            "Thunderstorm with slight hail",
            "thunderstorms-day",
            "thunderstorms-night",
        ),
        99 => WeatherCodeInfo::new(
            "Thunderstorm with heavy hail",
            "thunderstorms-day",
            "thunderstorms-night",
        ),
        _ => WeatherCodeInfo::new("Clear sky", "clear-day", "clear-night"),
    }
}

/// Day or night icon for `code` at instant `at`.
///
/// With both `sunrise` and `sunset`, it is day when the hour of `at` lies in
/// `[sunrise hour, sunset hour)`. Minutes are ignored. Without them the
/// window is 06:00 to 20:00.
pub fn pick_icon<Tz: TimeZone>(
    code: i32,
    at: &DateTime<Tz>,
    sunrise: Option<&DateTime<Tz>>,
    sunset: Option<&DateTime<Tz>>,
) -> &'static str {
    let hour = at.hour();
    let is_day = match (sunrise, sunset) {
        (Some(rise), Some(set)) => hour >= rise.hour() && hour < set.hour(),
        _ => (FALLBACK_DAY_START..FALLBACK_DAY_END).contains(&hour),
    };

    let info = weather_code_info(code);
    if is_day { info.day_icon } else { info.night_icon }
}

/// Public URL of the SVG for an icon identifier.
pub fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{icon}.svg")
}

/// Round to the nearest integer and append degrees Celsius.
pub fn format_temperature(value: f64) -> String {
    format_temperature_in(value, CELSIUS)
}

pub fn format_temperature_in(value: f64, unit: &str) -> String {
    format!("{}{unit}", round(value))
}

/// Nearest integer, never printed as "-0".
pub fn round(value: f64) -> i64 {
    value.round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// "Friday", "October"
    Long,
    /// "Fri", "Oct"
    Short,
}

/// Which date fields to print and how. `None` omits the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateStyle {
    pub weekday: Option<TextStyle>,
    pub month: Option<TextStyle>,
    pub day: bool,
}

impl Default for DateStyle {
    fn default() -> Self {
        Self {
            weekday: Some(TextStyle::Long),
            month: Some(TextStyle::Short),
            day: true,
        }
    }
}

impl DateStyle {
    pub fn weekday(mut self, weekday: Option<TextStyle>) -> Self {
        self.weekday = weekday;
        self
    }

    pub fn month(mut self, month: Option<TextStyle>) -> Self {
        self.month = month;
        self
    }

    pub fn day(mut self, day: bool) -> Self {
        self.day = day;
        self
    }
}

/// "Friday, Oct 16" with the default style.
pub fn format_date<Tz: TimeZone>(at: &DateTime<Tz>, style: DateStyle) -> String
where
    Tz::Offset: Display,
{
    let mut date = Vec::new();
    match style.month {
        Some(TextStyle::Long) => date.push(at.format("%B").to_string()),
        Some(TextStyle::Short) => date.push(at.format("%b").to_string()),
        None => {}
    }
    if style.day {
        date.push(at.format("%-d").to_string());
    }
    let date = date.join(" ");

    let weekday = match style.weekday {
        Some(TextStyle::Long) => Some(at.format("%A").to_string()),
        Some(TextStyle::Short) => Some(at.format("%a").to_string()),
        None => None,
    };

    match weekday {
        Some(w) if date.is_empty() => w,
        Some(w) => format!("{w}, {date}"),
        None => date,
    }
}

/// "3:05 PM"
pub fn format_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%-I:%M %p").to_string()
}

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Eight-point compass label for a bearing in degrees.
pub fn wind_direction_label(degrees: f64) -> &'static str {
    let sector = (degrees.rem_euclid(360.0) / 45.0).round() as usize % COMPASS.len();
    COMPASS[sector]
}
