//! Core library for the `weathernow` CLI.
//!
//! This crate defines:
//! - Configuration & unit preferences
//! - Validation and normalization of Open-Meteo forecasts
//! - WMO weather code interpretations
//! - Abstractions over forecast, search and reverse geocoding providers
//!
//! It is used by `weathernow-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod interpretation;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod schema;
pub mod service;
pub mod units;

pub use config::{Config, Endpoints, ProviderConfig};
pub use interpretation::{Interpretation, WeatherCode, interpretation_or_placeholder, lookup_interpretation};
pub use model::{
    Coordinates, CurrentRecord, DailyRecord, HourlyRecord, NormalizedWeather, Place, PlaceDetails,
    RawForecastResponse,
};
pub use normalize::normalize_forecast;
pub use provider::{ForecastProvider, GeocodingProvider, ReverseGeocoder, ReverseGeocoderId};
pub use schema::{ValidationError, validate_forecast_response};
pub use service::WeatherService;
pub use units::UnitSettings;
