use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    Config,
    error::Result,
    forecast::WeatherClient,
    geocode::GeocodeClient,
    model::{Coordinates, Location, WeatherSnapshot},
};

/// Forward and reverse place lookup.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn search_locations(&self, query: &str, count: usize) -> Result<Vec<Location>>;

    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Location>;
}

/// Source of complete weather snapshots.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, coordinates: Coordinates) -> Result<WeatherSnapshot>;
}

/// Geocoder configured from `config`.
pub fn location_provider_from_config(config: &Config) -> Result<Arc<dyn LocationProvider>> {
    let client = GeocodeClient::new(config.user_agent.clone())?
        .with_endpoints(&config.endpoints.search_url, &config.endpoints.reverse_url);
    Ok(Arc::new(client))
}

/// Forecast client configured from `config`.
pub fn weather_provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>> {
    let client = WeatherClient::new()?.with_endpoint(&config.endpoints.forecast_url);
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_build_from_default_config() {
        let cfg = Config::default();
        assert!(location_provider_from_config(&cfg).is_ok());
        assert!(weather_provider_from_config(&cfg).is_ok());
    }
}
