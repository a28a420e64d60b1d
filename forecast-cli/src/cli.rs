use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, Coordinates, Dashboard, DashboardSettings, DashboardView, Location, LocationProvider,
    Section, TextRegion, ViewRenderer, WeatherApp,
    geolocation::{FixedPosition, Geolocator, geolocator_from_config},
    provider::{location_provider_from_config, weather_provider_from_config},
};
use inquire::{Confirm, CustomType, Select, Text};
use std::{fmt, sync::Arc};

use crate::{interactive, terminal};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard once and exit.
    Show {
        /// Place to search for; the first match is shown.
        query: Option<String>,

        /// Use the current position instead of a search.
        #[arg(long, conflicts_with = "query")]
        here: bool,

        /// Current position as "LAT,LON", overriding the configured one.
        #[arg(long, value_name = "LAT,LON")]
        at: Option<Coordinates>,

        /// Print the location and weather snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List places matching a name.
    Search {
        query: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Live dashboard driven by stdin.
    Interactive {
        #[arg(long, value_name = "LAT,LON")]
        at: Option<Coordinates>,
    },

    /// Edit settings interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Show {
                query,
                here,
                at,
                json,
            } => show(&config, query, here, at, json).await,
            Command::Search { query, limit } => search(&config, &query, limit).await,
            Command::Interactive { at } => {
                let dash = build_dashboard(&config, at)?;
                interactive::run(dash, config.default_location.clone(), config.debounce()).await
            }
            Command::Configure => configure(config).await,
        }
    }
}

fn build_dashboard(config: &Config, at: Option<Coordinates>) -> Result<Dashboard<DashboardView>> {
    let app = WeatherApp::new(
        location_provider_from_config(config).context("Failed to create geocoding client")?,
        weather_provider_from_config(config).context("Failed to create forecast client")?,
        config.default_location.clone(),
    );
    let geolocator: Arc<dyn Geolocator> = match at {
        Some(position) => Arc::new(FixedPosition(position)),
        None => geolocator_from_config(config),
    };

    Ok(Dashboard::new(
        app,
        ViewRenderer::new(DashboardView::new()),
        geolocator,
        DashboardSettings::from(config),
    ))
}

async fn show(
    config: &Config,
    query: Option<String>,
    here: bool,
    at: Option<Coordinates>,
    json: bool,
) -> Result<()> {
    let mut dash = build_dashboard(config, at)?;

    match query {
        Some(query) => dash.search(&query).await,
        None if here => dash.use_my_location().await,
        None => dash.startup(config.default_location.clone()).await,
    }

    let view = dash.display();
    if view.is_visible(Section::Error) {
        bail!("{}", view.text(TextRegion::ErrorMessage));
    }

    if json {
        let out = serde_json::json!({
            "location": dash.app().current_location(),
            "weather": dash.app().current_weather(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", terminal::dashboard(view));
    }

    Ok(())
}

async fn search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    let locations = location_provider_from_config(config)?;
    let found = locations
        .search_locations(query, limit.unwrap_or(config.search_limit))
        .await
        .with_context(|| format!("Search for '{query}' failed"))?;

    if found.is_empty() {
        println!("No locations found.");
        return Ok(());
    }

    for (idx, location) in found.iter().enumerate() {
        println!(
            "{:>2}. {}  {} ({})  [{:.4}, {:.4}]",
            idx + 1,
            location.name,
            location.country,
            location.timezone,
            location.latitude,
            location.longitude
        );
    }

    Ok(())
}

/// Wrapper so search results read nicely in a `Select` prompt.
struct Choice(Location);

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} ({})", self.0.name, self.0.country, self.0.timezone)
    }
}

async fn configure(mut config: Config) -> Result<()> {
    config.search_limit = CustomType::<usize>::new("Results per search:")
        .with_default(config.search_limit)
        .prompt()?;

    config.debounce_ms = CustomType::<u64>::new("Suggestion delay (ms):")
        .with_default(config.debounce_ms)
        .prompt()?;

    let current = config
        .position
        .map(|p| format!("{},{}", p.latitude, p.longitude))
        .unwrap_or_default();
    let position = Text::new("Your position as LAT,LON (empty to disable):")
        .with_default(&current)
        .prompt()?;
    config.position = match position.trim() {
        "" => None,
        text => Some(text.parse::<Coordinates>()?),
    };

    let change_default = Confirm::new(&format!(
        "Change the default location ({})?",
        config.default_location.name
    ))
    .with_default(false)
    .prompt()?;

    if change_default {
        let query = Text::new("Search for a place:").prompt()?;
        let locations = location_provider_from_config(&config)?;
        let found = locations
            .search_locations(&query, config.search_limit)
            .await
            .with_context(|| format!("Search for '{query}' failed"))?;

        if found.is_empty() {
            println!("No locations found; keeping {}.", config.default_location.name);
        } else {
            let choices = found.into_iter().map(Choice).collect();
            let Choice(location) = Select::new("Default location:", choices).prompt()?;
            config.default_location = location;
        }
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
