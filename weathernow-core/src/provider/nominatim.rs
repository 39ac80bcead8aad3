//! Reverse geocoding through Nominatim (OpenStreetMap). No API key required.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::{Coordinates, PlaceDetails};

use super::{ReverseGeocoder, get_json, join_url};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    url: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            url: join_url(base_url, "reverse"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ReverseQuery<'a> {
    lat: f64,
    lon: f64,
    format: &'a str,
    addressdetails: u8,
    zoom: u8,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    country: Option<String>,
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn locate(&self, coords: Coordinates) -> Result<Option<PlaceDetails>> {
        let request = self.http.get(&self.url).query(&ReverseQuery {
            lat: coords.latitude,
            lon: coords.longitude,
            format: "json",
            addressdetails: 1,
            zoom: 10,
        });

        let json = get_json(request, "Nominatim reverse geocoding").await?;
        let parsed: NominatimResponse =
            serde_json::from_value(json).context("Unexpected Nominatim response shape")?;

        if let Some(error) = parsed.error {
            tracing::debug!(%error, "Nominatim has no result");
            return Ok(None);
        }

        Ok(parsed.address.map(|address| PlaceDetails {
            locality: address
                .city
                .or(address.town)
                .or(address.village)
                .or(address.municipality),
            country: address.country,
        }))
    }
}
