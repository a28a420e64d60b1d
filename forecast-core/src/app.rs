//! Session state and orchestration.
//!
//! [`WeatherApp`] owns the current location and the last snapshot. Every
//! request it starts is stamped with a [`RequestTicket`]; a completed request
//! is applied only if its ticket is still the newest of its kind, so a slow
//! response can never overwrite the result of a later request. Superseded
//! HTTP calls are left to finish and their results are dropped.

use std::{future::Future, pin::Pin, sync::Arc};
use tracing::{debug, info, warn};

use crate::{
    error::{Result, WeatherError},
    model::{Location, WeatherSnapshot},
    provider::{LocationProvider, WeatherProvider},
};

pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Weather,
    Search,
    Location,
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    kind: RequestKind,
    generation: u64,
}

impl RequestTicket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Generations {
    weather: u64,
    search: u64,
    location: u64,
}

impl Generations {
    fn slot(&mut self, kind: RequestKind) -> &mut u64 {
        match kind {
            RequestKind::Weather => &mut self.weather,
            RequestKind::Search => &mut self.search,
            RequestKind::Location => &mut self.location,
        }
    }

    fn issue(&mut self, kind: RequestKind) -> RequestTicket {
        let slot = self.slot(kind);
        *slot += 1;
        RequestTicket {
            kind,
            generation: *slot,
        }
    }

    fn is_latest(&self, ticket: RequestTicket) -> bool {
        let latest = match ticket.kind {
            RequestKind::Weather => self.weather,
            RequestKind::Search => self.search,
            RequestKind::Location => self.location,
        };
        latest == ticket.generation
    }
}

type Task<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// A request that has been issued but not run yet.
///
/// It owns everything it needs, so it can be moved onto a spawned task.
pub struct Pending<T> {
    ticket: RequestTicket,
    task: Task<T>,
}

impl<T> Pending<T> {
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    pub async fn run(self) -> Completed<T> {
        Completed {
            ticket: self.ticket,
            result: self.task.await,
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending").field("ticket", &self.ticket).finish()
    }
}

#[derive(Debug)]
pub struct Completed<T> {
    pub ticket: RequestTicket,
    pub result: Result<T>,
}

#[derive(Debug)]
pub struct WeatherApp {
    locations: Arc<dyn LocationProvider>,
    weather: Arc<dyn WeatherProvider>,
    current_location: Location,
    current_weather: Option<WeatherSnapshot>,
    generations: Generations,
}

impl WeatherApp {
    pub fn new(
        locations: Arc<dyn LocationProvider>,
        weather: Arc<dyn WeatherProvider>,
        default_location: Location,
    ) -> Self {
        Self {
            locations,
            weather,
            current_location: default_location,
            current_weather: None,
            generations: Generations::default(),
        }
    }

    pub fn current_location(&self) -> &Location {
        &self.current_location
    }

    pub fn current_weather(&self) -> Option<&WeatherSnapshot> {
        self.current_weather.as_ref()
    }

    pub fn set_current_location(&mut self, location: Location) {
        debug!(name = %location.name, "current location replaced");
        self.current_location = location;
    }

    /// True if no newer request of the same kind has been issued since `ticket`.
    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.generations.is_latest(ticket)
    }

    /// Reverse geocode and make the result the current location.
    ///
    /// On failure the previous location stays in place and the error is returned.
    pub async fn set_current_location_by_coords(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<&Location> {
        let done = self.request_location_by_coords(latitude, longitude).run().await;
        self.store_location(done.result)
    }

    /// Search places. An empty query returns nothing without asking upstream.
    pub async fn search_city(&mut self, query: &str, limit: usize) -> Result<Vec<Location>> {
        let done = self.request_search(query, limit).run().await;
        done.result
    }

    /// Fetch weather for `location` and store it as the current snapshot.
    pub async fn load_weather(&mut self, location: Option<&Location>) -> Result<&WeatherSnapshot> {
        let done = self.request_weather(location)?.run().await;
        self.store_weather(done.result)
    }

    /// Reload weather for the current location.
    pub async fn refresh(&mut self) -> Result<&WeatherSnapshot> {
        let location = self.current_location.clone();
        self.load_weather(Some(&location)).await
    }

    pub fn request_location_by_coords(&mut self, latitude: f64, longitude: f64) -> Pending<Location> {
        let ticket = self.generations.issue(RequestKind::Location);
        let locations = Arc::clone(&self.locations);
        Pending {
            ticket,
            task: Box::pin(async move { locations.reverse_geocode(latitude, longitude).await }),
        }
    }

    pub fn request_search(&mut self, query: &str, limit: usize) -> Pending<Vec<Location>> {
        let ticket = self.generations.issue(RequestKind::Search);
        let query = query.trim().to_string();
        if query.is_empty() {
            return Pending {
                ticket,
                task: Box::pin(async { Ok(Vec::new()) }),
            };
        }

        let locations = Arc::clone(&self.locations);
        Pending {
            ticket,
            task: Box::pin(async move { locations.search_locations(&query, limit).await }),
        }
    }

    /// Fails with `InvalidInput` when `location` is absent; nothing is issued then.
    pub fn request_weather(&mut self, location: Option<&Location>) -> Result<Pending<WeatherSnapshot>> {
        let location =
            location.ok_or_else(|| WeatherError::InvalidInput("No location provided".to_string()))?;

        let ticket = self.generations.issue(RequestKind::Weather);
        let weather = Arc::clone(&self.weather);
        let coordinates = location.coordinates();
        info!(name = %location.name, "loading weather");

        Ok(Pending {
            ticket,
            task: Box::pin(async move { weather.get_weather(coordinates).await }),
        })
    }

    /// Apply a finished reverse lookup. `None` means it was superseded.
    pub fn apply_location(&mut self, done: Completed<Location>) -> Option<Result<&Location>> {
        if !self.stamp_is_current(done.ticket) {
            return None;
        }
        Some(self.store_location(done.result))
    }

    /// Retire every request of `kind` still in flight so its reply is dropped.
    pub fn supersede(&mut self, kind: RequestKind) -> RequestTicket {
        self.generations.issue(kind)
    }

    /// Accept a finished search. `None` means it was superseded.
    pub fn accept_search(&self, done: Completed<Vec<Location>>) -> Option<Result<Vec<Location>>> {
        self.stamp_is_current(done.ticket).then_some(done.result)
    }

    /// Apply a finished weather fetch. `None` means it was superseded.
    pub fn apply_weather(&mut self, done: Completed<WeatherSnapshot>) -> Option<Result<&WeatherSnapshot>> {
        if !self.stamp_is_current(done.ticket) {
            return None;
        }
        Some(self.store_weather(done.result))
    }

    fn store_location(&mut self, result: Result<Location>) -> Result<&Location> {
        match result {
            Ok(location) => {
                self.set_current_location(location);
                Ok(&self.current_location)
            }
            Err(e) => {
                warn!("reverse geocode failed, keeping {}: {e}", self.current_location.name);
                Err(e)
            }
        }
    }

    fn store_weather(&mut self, result: Result<WeatherSnapshot>) -> Result<&WeatherSnapshot> {
        match result {
            Ok(snapshot) => Ok(&*self.current_weather.insert(snapshot)),
            Err(e) => {
                warn!("weather fetch failed for {}: {e}", self.current_location.name);
                Err(e)
            }
        }
    }

    fn stamp_is_current(&self, ticket: RequestTicket) -> bool {
        let current = self.is_latest(ticket);
        if !current {
            debug!(
                kind = ?ticket.kind,
                generation = ticket.generation,
                "discarding superseded result"
            );
        }
        current
    }
}
