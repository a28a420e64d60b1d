use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tracing::debug;

use crate::{
    Config,
    error::{Result, WeatherError},
    model::Coordinates,
};

/// A source of the device's current position.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates>;
}

/// Always reports the same position (configured by the user).
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates> {
        Ok(self.0)
    }
}

/// Used when no position source is available on this machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    async fn current_position(&self) -> Result<Coordinates> {
        Err(WeatherError::GeolocationUnavailable(
            "no position source configured".to_string(),
        ))
    }
}

/// Ask `geolocator` for a fresh fix, giving up after `timeout`.
pub async fn acquire_position(geolocator: &dyn Geolocator, timeout: Duration) -> Result<Coordinates> {
    match tokio::time::timeout(timeout, geolocator.current_position()).await {
        Ok(result) => result,
        Err(_) => {
            debug!(?timeout, "geolocation timed out");
            Err(WeatherError::GeolocationUnavailable(format!(
                "timed out after {} ms",
                timeout.as_millis()
            )))
        }
    }
}

pub fn geolocator_from_config(config: &Config) -> Arc<dyn Geolocator> {
    match config.position {
        Some(coords) => Arc::new(FixedPosition(coords)),
        None => Arc::new(NoGeolocation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NeverAnswers;

    #[async_trait]
    impl Geolocator for NeverAnswers {
        async fn current_position(&self) -> Result<Coordinates> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn fixed_position_is_returned() {
        let here = Coordinates::new(27.7, 85.3);
        let got = acquire_position(&FixedPosition(here), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(got, here);
    }

    #[tokio::test]
    async fn missing_source_is_unavailable() {
        let err = acquire_position(&NoGeolocation, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::GeolocationUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out() {
        let err = acquire_position(&NeverAnswers, Duration::from_millis(10_000))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("10000 ms"), "{err}");
    }

    #[test]
    fn config_position_selects_fixed_source() {
        let mut cfg = Config::default();
        assert!(format!("{:?}", geolocator_from_config(&cfg)).contains("NoGeolocation"));

        cfg.position = Some(Coordinates::new(1.0, 2.0));
        assert!(format!("{:?}", geolocator_from_config(&cfg)).contains("FixedPosition"));
    }
}
