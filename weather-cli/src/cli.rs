use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use log::info;
use tokio::sync::mpsc;

use travel_weather_core::{
    Config, ConfigPreferences, Coordinate, DisabledLocationProvider, DisplaySlot,
    FixedLocationProvider, IpLocationProvider, LocationProvider, OpenWeatherClient, Orchestrator,
    PreferenceStore, Screen, WeatherDisplay,
    location::ip_api::DEFAULT_IP_API_URL,
    preferences::{CITY_KEY, default_city},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "travel-weather", version, about = "Current weather for your city, a search and your location")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key and default city.
    Configure,

    /// Store the default city shown before a location fix arrives.
    SetCity {
        /// City name, e.g. "Lyon".
        name: String,
    },

    /// Show the weather screen: default city, location and an optional search.
    Show {
        /// City to search for.
        #[arg(long)]
        search: Option<String>,

        /// Latitude to use instead of IP geolocation.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to use instead of IP geolocation.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Skip the location lookup.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        no_location: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::SetCity { name } => set_city(&name),
            Command::Show { search, lat, lon, no_location } => {
                let coordinate = lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon));
                show(search, coordinate, no_location).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let current_city = config.preferences.get(CITY_KEY).cloned().unwrap_or_default();
    let city = Text::new("Default city:")
        .with_default(&current_city)
        .prompt()
        .context("Failed to read default city")?;

    config.set_api_key(api_key.trim().to_string());
    if !city.trim().is_empty() {
        config.preferences.insert(CITY_KEY.to_string(), city.trim().to_string());
    }
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn set_city(name: &str) -> anyhow::Result<()> {
    let city = name.trim();
    if city.is_empty() {
        anyhow::bail!("City name must not be empty");
    }

    ConfigPreferences::open()?.set_string(CITY_KEY, city)?;
    println!("Default city set to {city}");
    Ok(())
}

async fn show(
    search: Option<String>,
    coordinate: Option<Coordinate>,
    no_location: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = OpenWeatherClient::from_config(&config)?;
    let preferences = Arc::new(ConfigPreferences::open()?);

    let location: Arc<dyn LocationProvider> = match coordinate {
        _ if no_location => Arc::new(DisabledLocationProvider),
        Some(coordinate) => Arc::new(FixedLocationProvider::new(coordinate)),
        None => Arc::new(IpLocationProvider::new(DEFAULT_IP_API_URL, config.timeout())?),
    };

    info!("Default city: {}", default_city(preferences.as_ref()));

    let (tx, rx) = mpsc::unbounded_channel();
    let orchestrator = Orchestrator::new(Arc::new(client), location, preferences, tx)
        .with_location_delay(config.location_delay());

    orchestrator.prepare().await;
    if no_location {
        orchestrator.request_for_default_city();
    } else {
        orchestrator.activate();
    }
    if let Some(text) = search.as_deref() {
        orchestrator.request_for_searched_city(text);
    }
    // The request tasks hold the remaining senders; the screen stops once they finish.
    drop(orchestrator);

    let mut screen = Screen::new();
    screen
        .run(rx, |alert| eprintln!("[{}] {}", alert.title, alert.message))
        .await;

    print_slot("Local", screen.slot(DisplaySlot::Local));
    if search.is_some() {
        print_slot("Searched", screen.slot(DisplaySlot::Searched));
    }

    Ok(())
}

fn print_slot(label: &str, display: Option<&WeatherDisplay>) {
    match display {
        Some(d) => println!(
            "{label:<9} {city:<20} {temp:>8}  {desc} [{icon}]",
            city = d.city_name,
            temp = d.temperature,
            desc = d.description,
            icon = d.icon,
        ),
        None => println!("{label:<9} --"),
    }
}
