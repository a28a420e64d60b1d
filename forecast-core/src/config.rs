use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    app::DEFAULT_SEARCH_LIMIT,
    forecast::FORECAST_URL,
    geocode::{DEFAULT_USER_AGENT, REVERSE_URL, SEARCH_URL},
    model::{Coordinates, Location},
};

/// Upstream base URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub search_url: String,
    pub reverse_url: String,
    pub forecast_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search_url: SEARCH_URL.to_string(),
            reverse_url: REVERSE_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// search_limit = 5
/// debounce_ms = 400
///
/// [position]
/// latitude = 27.70076
/// longitude = 85.30014
///
/// [default_location]
/// name = "Kathmandu"
/// latitude = 27.70076
/// longitude = 85.30014
/// country = "Nepal"
/// timezone = "Asia/Kathmandu"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Results shown in the search dropdown.
    pub search_limit: usize,
    /// Shortest input that triggers suggestions.
    pub suggestion_min_chars: usize,
    pub debounce_ms: u64,
    pub geolocation_timeout_ms: u64,
    /// Sent to the reverse geocoding service, which requires one.
    pub user_agent: String,

    /// Where "use my location" puts you. Without it geolocation is unavailable.
    pub position: Option<Coordinates>,
    /// Used at startup when geolocation fails.
    pub default_location: Location,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_limit: DEFAULT_SEARCH_LIMIT,
            suggestion_min_chars: 3,
            debounce_ms: 400,
            geolocation_timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            position: None,
            default_location: Location::kathmandu(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_behaviour() {
        let cfg = Config::default();
        assert_eq!(cfg.default_location.name, "Kathmandu");
        assert_eq!(cfg.debounce(), Duration::from_millis(400));
        assert_eq!(cfg.geolocation_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.search_limit, 5);
        assert!(cfg.position.is_none());
        assert_eq!(cfg.endpoints.forecast_url, "https://api.open-meteo.com/v1/forecast");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.position = Some(Coordinates::new(28.26689, 83.96851));
        cfg.debounce_ms = 300;
        cfg.default_location.name = "Patan".into();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "debounce_ms = 250\n\n[endpoints]\nforecast_url = \"http://localhost:9/forecast\"\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.debounce_ms, 250);
        assert_eq!(cfg.endpoints.forecast_url, "http://localhost:9/forecast");
        assert_eq!(cfg.endpoints.search_url, SEARCH_URL);
        assert_eq!(cfg.geolocation_timeout_ms, 10_000);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "debounce_ms = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
