use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{Result, WeatherError, truncate_body};

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|source| WeatherError::Transport {
            endpoint: "http client",
            source,
        })
}

/// Send `request`, require a success status and decode the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    endpoint: &'static str,
) -> Result<T> {
    let res = request
        .send()
        .await
        .map_err(|source| WeatherError::Transport { endpoint, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| WeatherError::Transport { endpoint, source })?;

    if !status.is_success() {
        tracing::debug!(endpoint, %status, "upstream returned an error status");
        return Err(WeatherError::Network {
            endpoint,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| WeatherError::malformed(endpoint, e.to_string()))
}
