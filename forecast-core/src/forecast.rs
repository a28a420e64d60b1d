//! Open-Meteo forecast client.
//!
//! Everything is requested with `timeformat=unixtime` and converted to
//! `DateTime<Utc>` once, here. The raw response is validated before it
//! becomes a [`WeatherSnapshot`]: every column of a series must have the
//! same length and timestamps must be strictly ascending.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError},
    http::{build_client, get_json},
    model::{Coordinates, CurrentConditions, DailySeries, HourlySeries, WeatherSnapshot},
    provider::WeatherProvider,
};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const FORECAST_DAYS: u8 = 7;

const ENDPOINT: &str = "forecast";

const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "apparent_temperature",
    "weather_code",
    "relative_humidity_2m",
    "wind_speed_10m",
];

const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation_probability",
    "cloud_cover",
    "wind_speed_10m",
    "wind_direction_10m",
    "weather_code",
];

const DAILY_FIELDS: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "sunrise",
    "sunset",
    "uv_index_max",
    "rain_sum",
];

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    forecast_url: String,
}

impl WeatherClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            forecast_url: FORECAST_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, forecast_url: impl Into<String>) -> Self {
        self.forecast_url = forecast_url.into();
        self
    }

    /// Fetch current conditions plus a 7-day hourly and daily forecast.
    #[instrument(skip(self), level = "info")]
    pub async fn get_weather(&self, coordinates: Coordinates) -> Result<WeatherSnapshot> {
        let request = self.http.get(&self.forecast_url).query(&[
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("current", CURRENT_FIELDS.join(",")),
            ("hourly", HOURLY_FIELDS.join(",")),
            ("daily", DAILY_FIELDS.join(",")),
            ("forecast_days", FORECAST_DAYS.to_string()),
            ("timeformat", "unixtime".to_string()),
        ]);

        let raw: RawForecast = get_json(request, ENDPOINT).await?;
        let snapshot = raw.into_snapshot()?;

        debug!(
            hours = snapshot.hourly.len(),
            days = snapshot.daily.len(),
            "forecast parsed"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn get_weather(&self, coordinates: Coordinates) -> Result<WeatherSnapshot> {
        WeatherClient::get_weather(self, coordinates).await
    }
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    current: RawCurrent,
    hourly: RawHourly,
    daily: RawDaily,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    time: i64,
    temperature_2m: f64,
    apparent_temperature: f64,
    weather_code: i32,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    time: Vec<i64>,
    temperature_2m: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    wind_speed_10m: Vec<f64>,
    wind_direction_10m: Vec<f64>,
    weather_code: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    time: Vec<i64>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    sunrise: Vec<i64>,
    sunset: Vec<i64>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    rain_sum: Vec<Option<f64>>,
}

impl RawForecast {
    fn into_snapshot(self) -> Result<WeatherSnapshot> {
        Ok(WeatherSnapshot {
            current: self.current.into_conditions()?,
            hourly: self.hourly.into_series()?,
            daily: self.daily.into_series()?,
        })
    }
}

impl RawCurrent {
    fn into_conditions(self) -> Result<CurrentConditions> {
        Ok(CurrentConditions {
            time: instant(self.time, "current.time")?,
            temperature: self.temperature_2m,
            feels_like: self.apparent_temperature,
            weather_code: self.weather_code,
            humidity: self.relative_humidity_2m,
            wind_speed: self.wind_speed_10m,
        })
    }
}

impl RawHourly {
    fn into_series(self) -> Result<HourlySeries> {
        let n = self.time.len();
        expect_len("hourly.temperature_2m", self.temperature_2m.len(), n)?;
        expect_len("hourly.relative_humidity_2m", self.relative_humidity_2m.len(), n)?;
        expect_len("hourly.apparent_temperature", self.apparent_temperature.len(), n)?;
        expect_len("hourly.wind_speed_10m", self.wind_speed_10m.len(), n)?;
        expect_len("hourly.wind_direction_10m", self.wind_direction_10m.len(), n)?;
        expect_len("hourly.weather_code", self.weather_code.len(), n)?;

        Ok(HourlySeries {
            time: instants(&self.time, "hourly.time")?,
            temperature: self.temperature_2m,
            humidity: self.relative_humidity_2m,
            feels_like: self.apparent_temperature,
            precipitation_chance: optional_column(
                self.precipitation_probability,
                "hourly.precipitation_probability",
                n,
            )?,
            cloud_cover: optional_column(self.cloud_cover, "hourly.cloud_cover", n)?,
            wind_speed: self.wind_speed_10m,
            wind_direction: self.wind_direction_10m,
            weather_code: self.weather_code,
        })
    }
}

impl RawDaily {
    fn into_series(self) -> Result<DailySeries> {
        let n = self.time.len();
        expect_len("daily.weather_code", self.weather_code.len(), n)?;
        expect_len("daily.temperature_2m_max", self.temperature_2m_max.len(), n)?;
        expect_len("daily.temperature_2m_min", self.temperature_2m_min.len(), n)?;
        expect_len("daily.sunrise", self.sunrise.len(), n)?;
        expect_len("daily.sunset", self.sunset.len(), n)?;

        Ok(DailySeries {
            time: instants(&self.time, "daily.time")?,
            weather_code: self.weather_code,
            temp_max: self.temperature_2m_max,
            temp_min: self.temperature_2m_min,
            sunrise: self
                .sunrise
                .iter()
                .map(|&ts| instant(ts, "daily.sunrise"))
                .collect::<Result<_>>()?,
            sunset: self
                .sunset
                .iter()
                .map(|&ts| instant(ts, "daily.sunset"))
                .collect::<Result<_>>()?,
            uv_index_max: optional_column(self.uv_index_max, "daily.uv_index_max", n)?,
            rain_total: optional_column(self.rain_sum, "daily.rain_sum", n)?,
        })
    }
}

fn instant(ts: i64, field: &str) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| WeatherError::malformed(ENDPOINT, format!("{field}: bad timestamp {ts}")))
}

/// Convert a time column, requiring strictly ascending values.
fn instants(raw: &[i64], field: &str) -> Result<Vec<DateTime<Utc>>> {
    if let Some(pos) = raw.windows(2).position(|w| w[0] >= w[1]) {
        return Err(WeatherError::malformed(
            ENDPOINT,
            format!("{field} is not ascending at index {}", pos + 1),
        ));
    }
    raw.iter().map(|&ts| instant(ts, field)).collect()
}

fn expect_len(field: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(WeatherError::malformed(
            ENDPOINT,
            format!("{field} has {actual} entries, expected {expected}"),
        ));
    }
    Ok(())
}

/// Optional columns may be missing entirely; they are padded with `None`.
fn optional_column(
    values: Vec<Option<f64>>,
    field: &str,
    expected: usize,
) -> Result<Vec<Option<f64>>> {
    if values.is_empty() {
        return Ok(vec![None; expected]);
    }
    expect_len(field, values.len(), expected)?;
    Ok(values)
}
