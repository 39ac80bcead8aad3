//! Reverse geocoding through Azure Maps. Requires a subscription key.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::{Coordinates, PlaceDetails};

use super::{ReverseGeocoder, get_json, join_url};

pub const DEFAULT_AZURE_MAPS_URL: &str = "https://atlas.microsoft.com";

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AzureMapsGeocoder {
    api_key: String,
    http: Client,
    url: String,
}

impl AzureMapsGeocoder {
    pub fn new(http: Client, base_url: &str, api_key: String) -> Self {
        Self {
            api_key,
            http,
            url: join_url(base_url, "reverseGeocode"),
        }
    }
}

#[derive(Serialize)]
struct ReverseQuery<'a> {
    #[serde(rename = "api-version")]
    api_version: &'a str,
    /// "longitude,latitude"
    coordinates: String,
    #[serde(rename = "subscription-key")]
    subscription_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct AzResponse {
    features: Option<Vec<AzFeature>>,
}

#[derive(Debug, Deserialize)]
struct AzFeature {
    properties: Option<AzProperties>,
}

#[derive(Debug, Deserialize)]
struct AzProperties {
    address: Option<AzAddress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzAddress {
    locality: Option<String>,
    country_region: Option<AzCountryRegion>,
}

#[derive(Debug, Deserialize)]
struct AzCountryRegion {
    name: Option<String>,
}

#[async_trait]
impl ReverseGeocoder for AzureMapsGeocoder {
    async fn locate(&self, coords: Coordinates) -> Result<Option<PlaceDetails>> {
        let request = self.http.get(&self.url).query(&ReverseQuery {
            api_version: API_VERSION,
            coordinates: format!("{},{}", coords.longitude, coords.latitude),
            subscription_key: &self.api_key,
        });

        let json = get_json(request, "Azure Maps reverse geocoding").await?;
        let parsed: AzResponse =
            serde_json::from_value(json).context("Unexpected Azure Maps response shape")?;

        let features = parsed
            .features
            .ok_or_else(|| anyhow!("Azure Maps reverse geocoding returned no feature collection"))?;

        let Some(feature) = features.into_iter().next() else {
            return Ok(None);
        };

        let address = feature.properties.and_then(|p| p.address);
        Ok(Some(PlaceDetails {
            locality: address.as_ref().and_then(|a| a.locality.clone()),
            country: address
                .and_then(|a| a.country_region)
                .and_then(|c| c.name),
        }))
    }
}
