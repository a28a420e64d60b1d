//! The display handle the renderer writes into.
//!
//! [`DisplaySurface`] enumerates every region of the dashboard. A host (the
//! terminal front end, a test) implements it; [`DashboardView`] is an
//! in-memory implementation that records the latest state of each region.

use std::collections::HashMap;

use crate::model::Location;
use crate::presentation::icon_url;

/// Single-line text regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRegion {
    LocationName,
    /// "country • timezone"
    LocationCountry,
    CurrentDate,
    CurrentTemp,
    CurrentCondition,
    FeelsLike,
    Humidity,
    WindSpeed,
    ErrorMessage,
}

/// Regions that can be shown or hidden as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Loading,
    Error,
    CurrentWeather,
    HourlyForecast,
    DailyForecast,
    SearchResults,
}

impl Section {
    fn visible_by_default(self) -> bool {
        matches!(
            self,
            Section::CurrentWeather | Section::HourlyForecast | Section::DailyForecast
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub name: &'static str,
    pub alt: String,
}

impl Icon {
    pub fn url(&self) -> String {
        icon_url(self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyCard {
    pub time: String,
    pub icon: Icon,
    pub temperature: String,
    pub humidity: String,
    pub wind: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCard {
    pub weekday: String,
    pub date: String,
    pub icon: Icon,
    pub condition: String,
    pub temp_max: String,
    pub temp_min: String,
    pub rain: String,
    pub uv: String,
}

/// One entry of the search dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultItem {
    pub name: String,
    /// "country (timezone)"
    pub detail: String,
    pub location: Location,
}

impl From<&Location> for SearchResultItem {
    fn from(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            detail: format!("{} ({})", location.country, location.timezone),
            location: location.clone(),
        }
    }
}

pub trait DisplaySurface {
    fn set_text(&mut self, region: TextRegion, text: &str);

    fn set_current_icon(&mut self, icon: Icon);

    fn set_visible(&mut self, section: Section, visible: bool);

    fn clear_hourly_cards(&mut self);

    fn push_hourly_card(&mut self, card: HourlyCard);

    fn clear_daily_cards(&mut self);

    fn push_daily_card(&mut self, card: DailyCard);

    fn set_search_results(&mut self, items: Vec<SearchResultItem>);
}

/// Dashboard state kept in memory.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    text: HashMap<TextRegion, String>,
    visibility: HashMap<Section, bool>,
    current_icon: Option<Icon>,
    hourly: Vec<HourlyCard>,
    daily: Vec<DailyCard>,
    search_results: Vec<SearchResultItem>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of a region, "" if never written.
    pub fn text(&self, region: TextRegion) -> &str {
        self.text.get(&region).map(String::as_str).unwrap_or("")
    }

    pub fn is_visible(&self, section: Section) -> bool {
        self.visibility
            .get(&section)
            .copied()
            .unwrap_or_else(|| section.visible_by_default())
    }

    pub fn current_icon(&self) -> Option<&Icon> {
        self.current_icon.as_ref()
    }

    pub fn hourly_cards(&self) -> &[HourlyCard] {
        &self.hourly
    }

    pub fn daily_cards(&self) -> &[DailyCard] {
        &self.daily
    }

    pub fn search_results(&self) -> &[SearchResultItem] {
        &self.search_results
    }
}

impl DisplaySurface for DashboardView {
    fn set_text(&mut self, region: TextRegion, text: &str) {
        self.text.insert(region, text.to_string());
    }

    fn set_current_icon(&mut self, icon: Icon) {
        self.current_icon = Some(icon);
    }

    fn set_visible(&mut self, section: Section, visible: bool) {
        self.visibility.insert(section, visible);
    }

    fn clear_hourly_cards(&mut self) {
        self.hourly.clear();
    }

    fn push_hourly_card(&mut self, card: HourlyCard) {
        self.hourly.push(card);
    }

    fn clear_daily_cards(&mut self) {
        self.daily.clear();
    }

    fn push_daily_card(&mut self, card: DailyCard) {
        self.daily.push(card);
    }

    fn set_search_results(&mut self, items: Vec<SearchResultItem>) {
        self.search_results = items;
    }
}
