//! Writes locations and snapshots into a [`DisplaySurface`].
//!
//! The renderer holds no business state. Instants are shown in the machine's
//! local time zone, resolved per instant so DST changes are honoured, or in a
//! fixed offset when one is given. Daily entries are calendar days keyed at
//! midnight UTC, so their labels are formatted in UTC.

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::{
    display::{
        DailyCard, DisplaySurface, HourlyCard, Icon, SearchResultItem, Section, TextRegion,
    },
    model::{Location, WeatherSnapshot},
    presentation::{
        DateStyle, TextStyle, format_date, format_temperature, format_temperature_in,
        format_time, pick_icon, round, weather_code_info, wind_direction_label,
    },
};

pub const HOURLY_CARDS: usize = 12;
pub const DAILY_CARDS: usize = 7;

const PLACEHOLDER: &str = "--";

#[derive(Debug)]
pub struct ViewRenderer<D> {
    display: D,
    /// `None` renders in `Local`.
    offset: Option<FixedOffset>,
}

impl<D: DisplaySurface> ViewRenderer<D> {
    /// Render in the machine's local time zone.
    pub fn new(display: D) -> Self {
        Self {
            display,
            offset: None,
        }
    }

    pub fn with_offset(display: D, offset: FixedOffset) -> Self {
        Self {
            display,
            offset: Some(offset),
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }

    fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self.offset {
            Some(offset) => at.with_timezone(&offset),
            None => at.with_timezone(&Local).fixed_offset(),
        }
    }

    /// Show the loading indicator; hides the weather sections and any error.
    pub fn show_loading(&mut self) {
        self.display.set_visible(Section::Loading, true);
        self.set_weather_sections_visible(false);
        self.hide_error();
    }

    pub fn hide_loading(&mut self) {
        self.display.set_visible(Section::Loading, false);
        self.set_weather_sections_visible(true);
    }

    fn set_weather_sections_visible(&mut self, visible: bool) {
        for section in [
            Section::CurrentWeather,
            Section::HourlyForecast,
            Section::DailyForecast,
        ] {
            self.display.set_visible(section, visible);
        }
    }

    pub fn show_error(&mut self, message: &str) {
        self.display.set_text(TextRegion::ErrorMessage, message);
        self.display.set_visible(Section::Error, true);
    }

    pub fn hide_error(&mut self) {
        self.display.set_visible(Section::Error, false);
    }

    /// Current conditions and the location header. No-op unless both are present.
    pub fn update_current_weather(
        &mut self,
        location: Option<&Location>,
        snapshot: Option<&WeatherSnapshot>,
    ) {
        let (Some(location), Some(snapshot)) = (location, snapshot) else {
            return;
        };
        let current = &snapshot.current;
        let info = weather_code_info(current.weather_code);
        let time = self.local(current.time);
        let sunrise = snapshot.daily.sunrise.first().map(|t| self.local(*t));
        let sunset = snapshot.daily.sunset.first().map(|t| self.local(*t));

        self.display
            .set_text(TextRegion::LocationName, or_placeholder(&location.name));
        self.display.set_text(
            TextRegion::LocationCountry,
            &format!(
                "{} • {}",
                or_placeholder(&location.country),
                or_placeholder(&location.timezone)
            ),
        );
        self.display
            .set_text(TextRegion::CurrentDate, &format_date(&time, DateStyle::default()));
        self.display.set_current_icon(Icon {
            name: pick_icon(
                current.weather_code,
                &time,
                sunrise.as_ref(),
                sunset.as_ref(),
            ),
            alt: info.description.to_string(),
        });
        self.display
            .set_text(TextRegion::CurrentTemp, &round(current.temperature).to_string());
        self.display
            .set_text(TextRegion::CurrentCondition, info.description);
        self.display
            .set_text(TextRegion::FeelsLike, &format_temperature(current.feels_like));
        self.display
            .set_text(TextRegion::Humidity, &format!("{}%", round(current.humidity)));
        self.display.set_text(
            TextRegion::WindSpeed,
            &format!("{} km/h", round(current.wind_speed)),
        );
    }

    /// The next [`HOURLY_CARDS`] hours starting at the first hour not before `now`.
    pub fn update_hourly_forecast(&mut self, snapshot: Option<&WeatherSnapshot>, now: DateTime<Utc>) {
        let Some(snapshot) = snapshot else {
            return;
        };
        let hourly = &snapshot.hourly;
        let start = hourly.first_index_at_or_after(now);

        self.display.clear_hourly_cards();

        for (idx, time) in hourly.time.iter().enumerate().skip(start).take(HOURLY_CARDS) {
            let time = self.local(*time);
            let code = hourly.weather_code.get(idx).copied().unwrap_or(0);
            let wind_speed = hourly.wind_speed.get(idx).copied().unwrap_or(0.0);
            let wind = match hourly.wind_direction.get(idx) {
                Some(bearing) => {
                    format!("{} km/h {}", round(wind_speed), wind_direction_label(*bearing))
                }
                None => format!("{} km/h", round(wind_speed)),
            };

            self.display.push_hourly_card(HourlyCard {
                time: format_time(&time),
                icon: Icon {
                    name: pick_icon(code, &time, None, None),
                    alt: weather_code_info(code).description.to_string(),
                },
                temperature: hourly
                    .temperature
                    .get(idx)
                    .copied()
                    .flatten()
                    .map_or_else(|| PLACEHOLDER.to_string(), format_temperature),
                humidity: hourly
                    .humidity
                    .get(idx)
                    .copied()
                    .flatten()
                    .map_or_else(|| PLACEHOLDER.to_string(), |h| format!("{}%", round(h))),
                wind,
            });
        }
    }

    /// The first [`DAILY_CARDS`] days, whatever the current time.
    pub fn update_daily_forecast(&mut self, snapshot: Option<&WeatherSnapshot>) {
        let Some(snapshot) = snapshot else {
            return;
        };
        let daily = &snapshot.daily;

        self.display.clear_daily_cards();

        for (idx, day) in daily.time.iter().enumerate().take(DAILY_CARDS) {
            let code = daily.weather_code.get(idx).copied().unwrap_or(0);
            let info = weather_code_info(code);
            let rain = daily.rain_total.get(idx).copied().flatten().unwrap_or(0.0);
            let uv = daily.uv_index_max.get(idx).copied().flatten().unwrap_or(0.0);
            let weekday = DateStyle::default()
                .weekday(Some(TextStyle::Short))
                .month(None)
                .day(false);
            let month_day = DateStyle::default().weekday(None);

            self.display.push_daily_card(DailyCard {
                weekday: format_date(day, weekday),
                date: format_date(day, month_day),
                icon: Icon {
                    name: info.day_icon,
                    alt: info.description.to_string(),
                },
                condition: info.description.to_string(),
                temp_max: format_temperature_in(
                    daily.temp_max.get(idx).copied().unwrap_or(0.0),
                    "°",
                ),
                temp_min: format_temperature_in(
                    daily.temp_min.get(idx).copied().unwrap_or(0.0),
                    "°",
                ),
                rain: format!("{rain:.1}mm"),
                uv: round(uv).to_string(),
            });
        }
    }

    /// Draw every weather region and drop the loading indicator.
    pub fn render(&mut self, location: &Location, snapshot: &WeatherSnapshot, now: DateTime<Utc>) {
        self.update_current_weather(Some(location), Some(snapshot));
        self.update_hourly_forecast(Some(snapshot), now);
        self.update_daily_forecast(Some(snapshot));
        self.hide_loading();
    }

    /// Fill the search dropdown; an empty list hides it.
    pub fn show_search_results(&mut self, locations: &[Location]) {
        if locations.is_empty() {
            self.hide_search_results();
            return;
        }
        self.display
            .set_search_results(locations.iter().map(SearchResultItem::from).collect());
        self.display.set_visible(Section::SearchResults, true);
    }

    pub fn hide_search_results(&mut self) {
        self.display.set_visible(Section::SearchResults, false);
    }
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() { PLACEHOLDER } else { value }
}
