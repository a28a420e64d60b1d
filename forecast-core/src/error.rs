use thiserror::Error;

pub const LOAD_FAILED: &str = "Failed to load weather data.";
pub const NO_LOCATIONS: &str = "No locations found.";
pub const LOCATION_FAILED: &str = "Unable to get your location. Please search manually.";

/// Errors raised by the geocoding/forecast clients and the app controller.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The upstream endpoint answered with a non-success status.
    #[error("{endpoint} request failed with status {status}: {body}")]
    Network {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The request could not be sent or its body could not be read.
    #[error("{endpoint} request could not be completed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered, but not with the shape we expect.
    #[error("{endpoint} returned a malformed response: {reason}")]
    MalformedResponse { endpoint: &'static str, reason: String },

    #[error("No locations found for '{0}'")]
    NoResults(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Geolocation unavailable: {0}")]
    GeolocationUnavailable(String),
}

impl WeatherError {
    pub(crate) fn malformed(endpoint: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint,
            reason: reason.into(),
        }
    }

    /// Message suitable for the dashboard's error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoResults(_) => NO_LOCATIONS.to_string(),
            Self::GeolocationUnavailable(_) => LOCATION_FAILED.to_string(),
            Self::InvalidInput(_) => "Please choose a location first.".to_string(),
            Self::Network { .. } | Self::Transport { .. } | Self::MalformedResponse { .. } => {
                LOAD_FAILED.to_string()
            }
        }
    }

    /// True for failures caused by the network or an upstream service.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Transport { .. } | Self::MalformedResponse { .. }
        )
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

/// Shorten an error body so it stays readable in logs and messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_distinguish_nothing_found_from_failure() {
        assert_eq!(
            WeatherError::NoResults("zzz".into()).user_message(),
            "No locations found."
        );
        let err = WeatherError::malformed("forecast", "missing hourly");
        assert_eq!(err.user_message(), "Failed to load weather data.");
        assert!(err.is_upstream());
    }

    #[test]
    fn geolocation_message_suggests_manual_search() {
        let err = WeatherError::GeolocationUnavailable("timed out".into());
        assert!(err.user_message().contains("search manually"));
        assert!(!err.is_upstream());
    }

    #[test]
    fn network_error_mentions_status() {
        let err = WeatherError::Network {
            endpoint: "search",
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("502"), "{msg}");
        assert!(msg.contains("search"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
