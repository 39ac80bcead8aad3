use crate::{
    Config,
    model::{Coordinates, Place, PlaceDetails},
    provider::{azure_maps::AzureMapsGeocoder, nominatim::NominatimGeocoder},
};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod azure_maps;
pub mod nominatim;
pub mod open_meteo;

const USER_AGENT: &str = concat!("weathernow/", env!("CARGO_PKG_VERSION"));

/// Reverse geocoding backends that can label a coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReverseGeocoderId {
    Nominatim,
    AzureMaps,
}

impl ReverseGeocoderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReverseGeocoderId::Nominatim => "nominatim",
            ReverseGeocoderId::AzureMaps => "azure",
        }
    }

    pub const fn all() -> &'static [ReverseGeocoderId] {
        &[ReverseGeocoderId::Nominatim, ReverseGeocoderId::AzureMaps]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ReverseGeocoderId::AzureMaps)
    }
}

impl std::fmt::Display for ReverseGeocoderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReverseGeocoderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "nominatim" => Ok(ReverseGeocoderId::Nominatim),
            "azure" => Ok(ReverseGeocoderId::AzureMaps),
            _ => Err(anyhow!(
                "Unknown reverse geocoder '{value}'. Supported reverse geocoders: nominatim, azure."
            )),
        }
    }
}

/// Source of raw forecast payloads. Validation happens downstream.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(&self, coords: Coordinates) -> anyhow::Result<serde_json::Value>;
}

#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    async fn search(&self, name: &str) -> anyhow::Result<Vec<Place>>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    /// `Ok(None)` means the backend knows nothing about the coordinates.
    async fn locate(&self, coords: Coordinates) -> anyhow::Result<Option<PlaceDetails>>;
}

/// Shared HTTP client honouring the configured timeout.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Construct a reverse geocoder from config and explicit id.
pub fn reverse_geocoder_from_config(
    id: ReverseGeocoderId,
    config: &Config,
    http: Client,
) -> anyhow::Result<Box<dyn ReverseGeocoder>> {
    let boxed: Box<dyn ReverseGeocoder> = match id {
        ReverseGeocoderId::Nominatim => {
            Box::new(NominatimGeocoder::new(http, &config.endpoints.nominatim))
        }
        ReverseGeocoderId::AzureMaps => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow!(
                    "No API key configured for reverse geocoder '{id}'.\n\
                     Hint: run `weathernow configure {id}` and enter your API key."
                )
            })?;
            Box::new(AzureMapsGeocoder::new(http, &config.endpoints.azure_maps, api_key.to_owned()))
        }
    };

    Ok(boxed)
}

/// Construct the reverse geocoder selected in config (Nominatim when unset).
pub fn default_reverse_geocoder_from_config(
    config: &Config,
    http: Client,
) -> anyhow::Result<Box<dyn ReverseGeocoder>> {
    let id = config.reverse_geocoder_id()?;
    reverse_geocoder_from_config(id, config, http)
}

/// Send a GET request and decode a JSON body, failing on non-2xx statuses.
pub(crate) async fn get_json(request: RequestBuilder, what: &str) -> anyhow::Result<serde_json::Value> {
    let res = request
        .send()
        .await
        .with_context(|| format!("Failed to send request to {what}"))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read {what} response body"))?;

    if !status.is_success() {
        return Err(anyhow!(
            "{what} request failed with status {}: {}",
            status,
            truncate_body(&body),
        ));
    }

    serde_json::from_str(&body).with_context(|| format!("Failed to parse {what} JSON"))
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
