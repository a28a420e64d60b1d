//! Place search (Open-Meteo geocoding) and reverse lookup (Nominatim).

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::{
    error::Result,
    http::{build_client, get_json},
    model::Location,
    provider::LocationProvider,
};

pub const SEARCH_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_USER_AGENT: &str = "forecast-dashboard";

/// Name used when the reverse lookup yields nothing city-like.
pub const UNNAMED_PLACE: &str = "Current Location";

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    search_url: String,
    reverse_url: String,
    user_agent: String,
}

impl GeocodeClient {
    pub fn new(user_agent: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            search_url: SEARCH_URL.to_string(),
            reverse_url: REVERSE_URL.to_string(),
            user_agent: user_agent.into(),
        })
    }

    /// Point the client at different endpoints (self-hosted mirrors, tests).
    pub fn with_endpoints(
        mut self,
        search_url: impl Into<String>,
        reverse_url: impl Into<String>,
    ) -> Self {
        self.search_url = search_url.into();
        self.reverse_url = reverse_url.into();
        self
    }

    /// Search places by name. No matches is an empty list, not an error.
    #[instrument(skip(self), level = "info")]
    pub async fn search_locations(&self, query: &str, count: usize) -> Result<Vec<Location>> {
        let count = count.to_string();
        let request = self.http.get(&self.search_url).query(&[
            ("name", query),
            ("count", count.as_str()),
            ("language", "en"),
        ]);

        let parsed: SearchResponse = get_json(request, "location search").await?;

        let locations: Vec<Location> = parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .map(Location::from)
            .collect();

        debug!(matches = locations.len(), "location search finished");
        Ok(locations)
    }

    /// Resolve coordinates to a named place.
    #[instrument(skip(self), level = "info")]
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Location> {
        let request = self
            .http
            .get(&self.reverse_url)
            .header(header::USER_AGENT, &self.user_agent)
            .query(&[
                ("format", "json".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
                ("accept-language", "en".to_string()),
            ]);

        let parsed: ReverseResponse = get_json(request, "reverse geocode").await?;
        let address = parsed.address.unwrap_or_default();

        let location = Location {
            name: place_name(&address),
            latitude,
            longitude,
            country: address.country.unwrap_or_default(),
            timezone: local_timezone(),
        };

        info!(name = %location.name, "reverse geocoded");
        Ok(location)
    }
}

#[async_trait]
impl LocationProvider for GeocodeClient {
    async fn search_locations(&self, query: &str, count: usize) -> Result<Vec<Location>> {
        GeocodeClient::search_locations(self, query, count).await
    }

    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Location> {
        GeocodeClient::reverse_geocode(self, latitude, longitude).await
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    timezone: Option<String>,
}

impl From<SearchResult> for Location {
    fn from(r: SearchResult) -> Self {
        Location {
            name: r.name,
            latitude: r.latitude,
            longitude: r.longitude,
            country: r.country.unwrap_or_default(),
            timezone: r.timezone.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// Pick the most city-like name from a reverse-geocoded address.
///
/// Short municipality values are usually administrative codes, so they are
/// skipped.
fn place_name(address: &Address) -> String {
    let municipality = address
        .municipality
        .as_ref()
        .filter(|m| m.chars().count() > 3);

    address
        .city
        .as_ref()
        .or(address.town.as_ref())
        .or(municipality)
        .or(address.county.as_ref())
        .or(address.state.as_ref())
        .cloned()
        .unwrap_or_else(|| UNNAMED_PLACE.to_string())
}

/// IANA name of the timezone this process runs in.
pub fn local_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|e| {
        debug!("could not resolve local timezone: {e}");
        "UTC".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeatherError;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn address(json: serde_json::Value) -> Address {
        serde_json::from_value(json).unwrap()
    }

    async fn client_for(server: &MockServer) -> GeocodeClient {
        GeocodeClient::new("forecast-tests")
            .unwrap()
            .with_endpoints(
                format!("{}/v1/search", server.uri()),
                format!("{}/reverse", server.uri()),
            )
    }

    #[test]
    fn place_name_prefers_city() {
        let a = address(serde_json::json!({"city": "X", "town": "Y"}));
        assert_eq!(place_name(&a), "X");
    }

    #[test]
    fn place_name_uses_town_without_city() {
        let a = address(serde_json::json!({"town": "Y", "county": "Z"}));
        assert_eq!(place_name(&a), "Y");
    }

    #[test]
    fn place_name_skips_short_municipality() {
        let a = address(serde_json::json!({"municipality": "AB"}));
        assert_eq!(place_name(&a), UNNAMED_PLACE);

        let a = address(serde_json::json!({"municipality": "ABC", "county": "Bagmati"}));
        assert_eq!(place_name(&a), "Bagmati");

        let a = address(serde_json::json!({"municipality": "AB", "state": "Bagmati Province"}));
        assert_eq!(place_name(&a), "Bagmati Province");
    }

    #[test]
    fn place_name_accepts_long_municipality() {
        let a = address(serde_json::json!({"municipality": "Kathmandu", "county": "Z"}));
        assert_eq!(place_name(&a), "Kathmandu");
    }

    #[test]
    fn place_name_defaults_when_empty() {
        assert_eq!(place_name(&Address::default()), "Current Location");
    }

    #[tokio::test]
    async fn search_maps_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Pokhara"))
            .and(query_param("count", "5"))
            .and(query_param("language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {
                        "id": 1282898,
                        "name": "Pokhara",
                        "latitude": 28.26689,
                        "longitude": 83.96851,
                        "country": "Nepal",
                        "timezone": "Asia/Kathmandu",
                        "admin1": "Gandaki Province"
                    },
                    {"name": "Pokhara Lake", "latitude": 28.2, "longitude": 83.9}
                ],
                "generationtime_ms": 0.5
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let found = client.search_locations("Pokhara", 5).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Pokhara");
        assert_eq!(found[0].country, "Nepal");
        assert_eq!(found[0].timezone, "Asia/Kathmandu");
        assert_eq!(found[1].country, "");
    }

    #[tokio::test]
    async fn search_without_results_key_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"generationtime_ms": 0.3})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let found = client.search_locations("qqqqzzzz", 10).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn search_error_status_is_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.search_locations("Pokhara", 5).await.unwrap_err();
        assert!(matches!(err, WeatherError::Network { status, .. } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn reverse_sends_identifying_header_and_parses_address() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(header("user-agent", "forecast-tests"))
            .and(query_param("format", "json"))
            .and(query_param("zoom", "10"))
            .and(query_param("addressdetails", "1"))
            .and(query_param("accept-language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_name": "Lalitpur, Bagmati Province, Nepal",
                "address": {
                    "city": "Lalitpur",
                    "state": "Bagmati Province",
                    "country": "Nepal",
                    "country_code": "np"
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let loc = client.reverse_geocode(27.67, 85.32).await.unwrap();

        assert_eq!(loc.name, "Lalitpur");
        assert_eq!(loc.country, "Nepal");
        assert_eq!(loc.latitude, 27.67);
        assert_eq!(loc.longitude, 85.32);
        assert!(!loc.timezone.is_empty());
    }

    #[tokio::test]
    async fn reverse_without_address_uses_placeholder_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error": "Unable to geocode"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let loc = client.reverse_geocode(0.0, -140.0).await.unwrap();

        assert_eq!(loc.name, "Current Location");
        assert_eq!(loc.country, "");
    }

    #[tokio::test]
    async fn reverse_error_status_is_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.reverse_geocode(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::Network { .. }));
    }
}
