use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::WeatherError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Parses "LAT,LON", e.g. "27.70076,85.30014".
impl FromStr for Coordinates {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WeatherError::InvalidInput(format!("expected LAT,LON, got '{s}'"));

        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidInput(format!(
                "coordinates out of range: {latitude},{longitude}"
            )));
        }

        Ok(Self::new(latitude, longitude))
    }
}

/// A named geographic point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub timezone: String,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Kathmandu, used when nothing better is known.
    pub fn kathmandu() -> Self {
        Self {
            name: "Kathmandu".to_string(),
            latitude: 27.70076,
            longitude: 85.30014,
            country: "Nepal".to_string(),
            timezone: "Asia/Kathmandu".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub weather_code: i32,
    /// Relative humidity, 0-100.
    pub humidity: f64,
    pub wind_speed: f64,
}

/// Hourly forecast stored as parallel columns; index `i` is one hour.
///
/// Built through [`crate::forecast`] parsing, which guarantees every column
/// has the same length and `time` is strictly ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct HourlySeries {
    pub time: Vec<DateTime<Utc>>,
    /// Open-Meteo reports `null` for hours past a model's horizon.
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub feels_like: Vec<Option<f64>>,
    pub precipitation_chance: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub wind_speed: Vec<f64>,
    pub wind_direction: Vec<f64>,
    pub weather_code: Vec<i32>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Index of the first hour at or after `now`, or 0 when every hour is in the past.
    pub fn first_index_at_or_after(&self, now: DateTime<Utc>) -> usize {
        self.time.iter().position(|t| *t >= now).unwrap_or(0)
    }
}

/// Daily forecast stored as parallel columns; index `i` is one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DailySeries {
    pub time: Vec<DateTime<Utc>>,
    pub weather_code: Vec<i32>,
    pub temp_max: Vec<f64>,
    pub temp_min: Vec<f64>,
    pub sunrise: Vec<DateTime<Utc>>,
    pub sunset: Vec<DateTime<Utc>>,
    pub uv_index_max: Vec<Option<f64>>,
    pub rain_total: Vec<Option<f64>>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// One complete current + hourly + daily fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    pub daily: DailySeries,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hours(start: i64, n: usize) -> HourlySeries {
        HourlySeries {
            time: (0..n)
                .map(|i| Utc.timestamp_opt(start + i as i64 * 3600, 0).unwrap())
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn first_index_finds_exact_match() {
        let series = hours(1_700_000_000, 24);
        let now = series.time[5];
        assert_eq!(series.first_index_at_or_after(now), 5);
    }

    #[test]
    fn first_index_rounds_up_between_hours() {
        let series = hours(1_700_000_000, 24);
        let now = series.time[5] + chrono::Duration::minutes(1);
        assert_eq!(series.first_index_at_or_after(now), 6);
    }

    #[test]
    fn first_index_falls_back_to_zero_for_stale_data() {
        let series = hours(1_700_000_000, 24);
        let now = series.time[23] + chrono::Duration::hours(3);
        assert_eq!(series.first_index_at_or_after(now), 0);
    }

    #[test]
    fn coordinates_parse_from_pair() {
        let c: Coordinates = "27.70076, 85.30014".parse().unwrap();
        assert_eq!(c, Coordinates::new(27.70076, 85.30014));
    }

    #[test]
    fn coordinates_reject_garbage_and_out_of_range() {
        assert!("27.7".parse::<Coordinates>().is_err());
        assert!("north,east".parse::<Coordinates>().is_err());
        assert!(matches!(
            "91,0".parse::<Coordinates>(),
            Err(WeatherError::InvalidInput(_))
        ));
    }

    #[test]
    fn location_deserializes_without_country_or_timezone() {
        let loc: Location =
            serde_json::from_str(r#"{"name":"X","latitude":1.0,"longitude":2.0}"#).unwrap();
        assert_eq!(loc.country, "");
        assert_eq!(loc.timezone, "");
        assert_eq!(loc.coordinates(), Coordinates::new(1.0, 2.0));
    }
}
