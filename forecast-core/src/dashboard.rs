//! Top-level flows of the dashboard: startup, search, "use my location",
//! suggestions and refresh.
//!
//! This is the one place where errors turn into banner messages. Nothing in
//! here returns an error; after any failure the dashboard stays usable.
//!
//! Each flow comes in two halves where the network is involved (`begin_*`
//! hands out a [`Pending`] request, `finish_*` applies it) so a host with an
//! event loop can run requests on spawned tasks. The async convenience
//! methods simply run both halves in sequence.

use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::{
    Config,
    app::{Completed, Pending, RequestKind, WeatherApp},
    display::DisplaySurface,
    error::WeatherError,
    geolocation::{Geolocator, acquire_position},
    model::{Location, WeatherSnapshot},
    render::ViewRenderer,
};

pub use crate::error::{LOAD_FAILED, LOCATION_FAILED, NO_LOCATIONS};

pub const SEARCH_FAILED: &str = "Search failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub search_limit: usize,
    pub suggestion_min_chars: usize,
    pub geolocation_timeout: Duration,
}

impl From<&Config> for DashboardSettings {
    fn from(config: &Config) -> Self {
        Self {
            search_limit: config.search_limit,
            suggestion_min_chars: config.suggestion_min_chars,
            geolocation_timeout: config.geolocation_timeout(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

pub struct Dashboard<D> {
    app: WeatherApp,
    view: ViewRenderer<D>,
    geolocator: Arc<dyn Geolocator>,
    settings: DashboardSettings,
    suggestions: Vec<Location>,
    clock: fn() -> DateTime<Utc>,
}

impl<D: DisplaySurface> Dashboard<D> {
    pub fn new(
        app: WeatherApp,
        view: ViewRenderer<D>,
        geolocator: Arc<dyn Geolocator>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            app,
            view,
            geolocator,
            settings,
            suggestions: Vec::new(),
            clock: Utc::now,
        }
    }

    /// Replace the source of "now" used to pick the first hourly card.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn app(&self) -> &WeatherApp {
        &self.app
    }

    pub fn view(&self) -> &ViewRenderer<D> {
        &self.view
    }

    pub fn display(&self) -> &D {
        self.view.display()
    }

    pub fn suggestions(&self) -> &[Location] {
        &self.suggestions
    }

    /// Start loading weather for the current location.
    pub fn begin_load(&mut self) -> Option<Pending<WeatherSnapshot>> {
        self.view.show_loading();
        let location = self.app.current_location().clone();
        match self.app.request_weather(Some(&location)) {
            Ok(pending) => Some(pending),
            Err(e) => {
                warn!("cannot load weather: {e}");
                self.fail(&e.user_message());
                None
            }
        }
    }

    /// Render a finished load. Superseded loads are ignored.
    pub fn finish_load(&mut self, done: Completed<WeatherSnapshot>) {
        let now = (self.clock)();
        match self.app.apply_weather(done) {
            None => {}
            Some(Ok(_)) => {
                if let Some(snapshot) = self.app.current_weather() {
                    self.view.render(self.app.current_location(), snapshot, now);
                }
            }
            Some(Err(e)) => {
                warn!("weather refresh failed: {e}");
                self.fail(&e.user_message());
            }
        }
    }

    pub async fn load_and_render(&mut self) {
        if let Some(pending) = self.begin_load() {
            let done = pending.run().await;
            self.finish_load(done);
        }
    }

    /// Try geolocation; on any failure quietly fall back to `default`.
    pub async fn resolve_startup_location(&mut self, default: Location) {
        match self.locate().await {
            Ok(location) => info!(name = %location.name, "starting at current position"),
            Err(e) => {
                warn!("geolocation failed, using default: {e}");
                self.app.set_current_location(default);
            }
        }
    }

    pub async fn startup(&mut self, default: Location) {
        self.resolve_startup_location(default).await;
        self.load_and_render().await;
    }

    async fn locate(&mut self) -> Result<Location, WeatherError> {
        let position =
            acquire_position(self.geolocator.as_ref(), self.settings.geolocation_timeout).await?;
        let location = self
            .app
            .set_current_location_by_coords(position.latitude, position.longitude)
            .await?;
        Ok(location.clone())
    }

    /// Search and make the first match current. Returns false (with a banner) otherwise.
    pub async fn resolve_search(&mut self, query: &str) -> bool {
        if query.trim().is_empty() {
            return false;
        }
        self.view.show_loading();

        match self.app.search_city(query, self.settings.search_limit).await {
            Ok(results) => match results.into_iter().next() {
                Some(first) => {
                    self.app.set_current_location(first);
                    true
                }
                None => {
                    self.fail(&WeatherError::NoResults(query.to_string()).user_message());
                    false
                }
            },
            Err(e) => {
                warn!("search for '{query}' failed: {e}");
                let message = if e.is_upstream() {
                    SEARCH_FAILED.to_string()
                } else {
                    e.user_message()
                };
                self.fail(&message);
                false
            }
        }
    }

    pub async fn search(&mut self, query: &str) {
        if self.resolve_search(query).await {
            self.load_and_render().await;
        }
    }

    /// Explicit "use my location": failures are shown, unlike at startup.
    pub async fn resolve_my_location(&mut self) -> bool {
        self.view.show_loading();
        match self.locate().await {
            Ok(location) => {
                self.choose(location);
                true
            }
            Err(e) => {
                warn!("use my location failed: {e}");
                self.fail(LOCATION_FAILED);
                false
            }
        }
    }

    pub async fn use_my_location(&mut self) {
        if self.resolve_my_location().await {
            self.load_and_render().await;
        }
    }

    /// Make `location` current and close the dropdown.
    pub fn choose(&mut self, location: Location) {
        self.close_suggestions();
        self.app.set_current_location(location);
    }

    /// Hide the dropdown and drop any lookup still in flight for it.
    fn close_suggestions(&mut self) {
        self.app.supersede(RequestKind::Search);
        self.suggestions.clear();
        self.view.hide_search_results();
    }

    pub async fn select_location(&mut self, location: Location) {
        self.choose(location);
        self.load_and_render().await;
    }

    /// Stop the loading indicator and show `message` in the banner.
    fn fail(&mut self, message: &str) {
        self.view.hide_loading();
        self.view.show_error(message);
    }

    /// Suggestion `index` from the last dropdown, zero based.
    pub fn suggestion(&self, index: usize) -> Option<&Location> {
        self.suggestions.get(index)
    }

    /// Start a dropdown lookup, or hide the dropdown if `query` is too short.
    pub fn begin_suggestions(&mut self, query: &str) -> Option<Pending<Vec<Location>>> {
        let query = query.trim();
        if query.chars().count() < self.settings.suggestion_min_chars {
            self.close_suggestions();
            return None;
        }
        Some(self.app.request_search(query, self.settings.search_limit))
    }

    /// Show finished suggestions. Errors are only logged.
    pub fn finish_suggestions(&mut self, done: Completed<Vec<Location>>) {
        match self.app.accept_search(done) {
            None => {}
            Some(Ok(locations)) => {
                self.view.show_search_results(&locations);
                self.suggestions = locations;
            }
            Some(Err(e)) => warn!("suggestion lookup failed: {e}"),
        }
    }

    pub async fn suggest(&mut self, query: &str) {
        if let Some(pending) = self.begin_suggestions(query) {
            let done = pending.run().await;
            self.finish_suggestions(done);
        }
    }
}

impl<D> std::fmt::Debug for Dashboard<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("app", &self.app)
            .field("settings", &self.settings)
            .field("suggestions", &self.suggestions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let mut cfg = Config::default();
        cfg.search_limit = 8;
        cfg.geolocation_timeout_ms = 2_500;

        let settings = DashboardSettings::from(&cfg);
        assert_eq!(settings.search_limit, 8);
        assert_eq!(settings.suggestion_min_chars, 3);
        assert_eq!(settings.geolocation_timeout, Duration::from_millis(2_500));
    }
}
