use anyhow::{Context, anyhow, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weathernow_core::{
    Config, Coordinates, ReverseGeocoderId, ValidationError, WeatherService,
    units::{PrecipitationUnit, TemperatureUnit, WindSpeedUnit},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathernow", version, about = "Seven-day weather forecasts in your terminal")]
pub struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search for places by name.
    Search {
        /// Place name, e.g. "Berlin".
        name: String,
    },

    /// Show current conditions and the seven-day forecast.
    Show {
        /// Place name; the first search match is used.
        #[arg(required_unless_present = "lat", conflicts_with_all = ["lat", "lon"])]
        query: Option<String>,

        /// Latitude in decimal degrees.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Which day's hours to list, 0 being today.
        #[arg(long, default_value_t = 0)]
        day: usize,
    },

    /// Show or change the units forecasts are displayed in.
    Units {
        /// Switch every unit to the other measurement system.
        #[arg(long, conflicts_with_all = ["temperature", "wind", "precipitation"])]
        switch: bool,

        /// "celsius" or "fahrenheit".
        #[arg(long, value_parser = parse_temperature)]
        temperature: Option<TemperatureUnit>,

        /// "kmh" or "mph".
        #[arg(long, value_parser = parse_wind_speed)]
        wind: Option<WindSpeedUnit>,

        /// "mm" or "inch".
        #[arg(long, value_parser = parse_precipitation)]
        precipitation: Option<PrecipitationUnit>,
    },

    /// Select a reverse geocoder and store its credentials.
    Configure {
        /// Reverse geocoder short name, "nominatim" or "azure".
        provider: String,
    },
}

fn parse_temperature(s: &str) -> Result<TemperatureUnit, String> {
    match s.to_lowercase().as_str() {
        "c" | "celsius" => Ok(TemperatureUnit::Celsius),
        "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
        _ => Err(format!("unknown temperature unit '{s}'")),
    }
}

fn parse_wind_speed(s: &str) -> Result<WindSpeedUnit, String> {
    match s.to_lowercase().as_str() {
        "kmh" | "km/h" => Ok(WindSpeedUnit::Kmh),
        "mph" => Ok(WindSpeedUnit::Mph),
        _ => Err(format!("unknown wind speed unit '{s}'")),
    }
}

fn parse_precipitation(s: &str) -> Result<PrecipitationUnit, String> {
    match s.to_lowercase().as_str() {
        "mm" => Ok(PrecipitationUnit::Mm),
        "in" | "inch" => Ok(PrecipitationUnit::Inch),
        _ => Err(format!("unknown precipitation unit '{s}'")),
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Search { name } => {
                let config = Config::load()?;
                let service = WeatherService::from_config(&config)?;

                let places = service.search(&name).await?;
                print!("{}", render::places(&places));
            }
            Command::Show {
                query,
                lat,
                lon,
                day,
            } => {
                let config = Config::load()?;
                let service = WeatherService::from_config(&config)?;

                let (coords, place_label) = match (query, lat, lon) {
                    (Some(query), _, _) => {
                        let place = service
                            .search(&query)
                            .await?
                            .into_iter()
                            .next()
                            .ok_or_else(|| anyhow!("No place found matching '{query}'"))?;
                        (place.coordinates(), Some(place.label()))
                    }
                    (None, Some(latitude), Some(longitude)) => (
                        Coordinates {
                            latitude,
                            longitude,
                        },
                        None,
                    ),
                    _ => bail!("Give a place name or both --lat and --lon"),
                };

                let (weather, details) =
                    tokio::join!(service.forecast(coords, Utc::now()), service.locate(coords));

                let weather = weather.map_err(|err| {
                    if err.downcast_ref::<ValidationError>().is_some() {
                        err.context("Weather unavailable: the provider sent an unusable forecast")
                    } else {
                        err
                    }
                })?;

                let label = place_label
                    .or_else(|| details.and_then(|d| d.label()))
                    .unwrap_or_else(|| render::UNKNOWN_LOCATION.to_string());

                print!("{}", render::forecast(&label, &weather, &config.units, day)?);
            }
            Command::Units {
                switch,
                temperature,
                wind,
                precipitation,
            } => {
                let mut config = Config::load()?;
                let before = config.units;

                if switch {
                    config.units = config.units.switch_target();
                }
                if let Some(unit) = temperature {
                    config.units.temperature = unit;
                }
                if let Some(unit) = wind {
                    config.units.wind_speed = unit;
                }
                if let Some(unit) = precipitation {
                    config.units.precipitation = unit;
                }

                if config.units != before {
                    config.save()?;
                    tracing::debug!(units = %config.units, "saved unit preferences");
                }
                print!("{}", render::units(&config.units));
            }
            Command::Configure { provider } => {
                let id = ReverseGeocoderId::try_from(provider.as_str())?;
                let mut config = Config::load()?;

                if id.requires_api_key() {
                    let api_key = Password::new(&format!("API key for {id}:"))
                        .with_display_mode(PasswordDisplayMode::Masked)
                        .without_confirmation()
                        .prompt()
                        .context("Failed to read API key")?;

                    let api_key = api_key.trim();
                    if api_key.is_empty() {
                        bail!("API key must not be empty");
                    }
                    config.upsert_provider_api_key(id, api_key.to_string());
                }

                config.set_reverse_geocoder(id);
                config.save()?;

                println!(
                    "Reverse geocoder set to {id} ({}).",
                    Config::config_file_path()?.display()
                );
            }
        }

        Ok(())
    }
}
