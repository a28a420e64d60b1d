//! Core library for the `forecast` dashboard.
//!
//! This crate defines:
//! - Geocoding and forecast clients (Open-Meteo, Nominatim)
//! - Shared domain models (locations, weather snapshots)
//! - Presentation helpers and a renderer over an abstract display surface
//! - The app controller that ties them together
//!
//! It is used by `forecast-cli`, but the renderer can drive any host that
//! implements [`DisplaySurface`].

pub mod app;
pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod display;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod geolocation;
mod http;
pub mod model;
pub mod presentation;
pub mod provider;
pub mod render;

pub use app::{Completed, Pending, RequestKind, RequestTicket, WeatherApp};
pub use config::{Config, Endpoints};
pub use dashboard::{Dashboard, DashboardSettings};
pub use debounce::Debouncer;
pub use display::{DashboardView, DisplaySurface, Section, TextRegion};
pub use error::WeatherError;
pub use forecast::WeatherClient;
pub use geocode::GeocodeClient;
pub use geolocation::{Geolocator, acquire_position};
pub use model::{
    Coordinates, CurrentConditions, DailySeries, HourlySeries, Location, WeatherSnapshot,
};
pub use provider::{LocationProvider, WeatherProvider};
pub use render::ViewRenderer;
