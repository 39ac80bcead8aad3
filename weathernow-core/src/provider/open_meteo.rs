use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    model::{Coordinates, Place},
    normalize::FETCH_DAYS,
};

use super::{ForecastProvider, GeocodingProvider, get_json, join_url};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

const DAILY_VARIABLES: &str = "weather_code,temperature_2m_max,temperature_2m_min";
const HOURLY_VARIABLES: &str = "temperature_2m,weather_code";
const CURRENT_VARIABLES: &str =
    "temperature_2m,weather_code,apparent_temperature,wind_speed_10m,precipitation,relative_humidity_2m";

/// Open-Meteo forecast and geocoding search.
#[derive(Debug, Clone)]
pub struct OpenMeteo {
    http: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteo {
    pub fn new(http: Client, forecast_url: &str, geocoding_url: &str) -> Self {
        Self {
            http,
            forecast_url: join_url(forecast_url, "v1/forecast"),
            geocoding_url: join_url(geocoding_url, "v1/search"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    timezone: &'a str,
    timeformat: &'a str,
    forecast_days: u64,
    daily: &'a str,
    hourly: &'a str,
    current: &'a str,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<Place>>,
}

#[async_trait]
impl ForecastProvider for OpenMeteo {
    async fn fetch_forecast(&self, coords: Coordinates) -> Result<serde_json::Value> {
        tracing::debug!(
            latitude = coords.latitude,
            longitude = coords.longitude,
            "requesting Open-Meteo forecast"
        );

        let request = self.http.get(&self.forecast_url).query(&ForecastQuery {
            latitude: coords.latitude,
            longitude: coords.longitude,
            timezone: "auto",
            timeformat: "unixtime",
            // One day more than shown, so DST shifts can be trimmed.
            forecast_days: FETCH_DAYS,
            daily: DAILY_VARIABLES,
            hourly: HOURLY_VARIABLES,
            current: CURRENT_VARIABLES,
        });

        get_json(request, "Open-Meteo forecast").await
    }
}

#[async_trait]
impl GeocodingProvider for OpenMeteo {
    async fn search(&self, name: &str) -> Result<Vec<Place>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(name, "searching Open-Meteo geocoding");

        let request = self.http.get(&self.geocoding_url).query(&SearchQuery { name });
        let json = get_json(request, "Open-Meteo geocoding").await?;
        let parsed: SearchResponse =
            serde_json::from_value(json).context("Unexpected Open-Meteo geocoding response shape")?;

        Ok(parsed.results.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenMeteo {
        OpenMeteo::new(Client::new(), &server.uri(), &server.uri())
    }

    #[tokio::test]
    async fn forecast_request_carries_fixed_parameters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "52.52"))
            .and(query_param("longitude", "13.41"))
            .and(query_param("timezone", "auto"))
            .and(query_param("timeformat", "unixtime"))
            .and(query_param("forecast_days", "8"))
            .and(query_param("daily", DAILY_VARIABLES))
            .and(query_param("hourly", HOURLY_VARIABLES))
            .and(query_param("current", CURRENT_VARIABLES))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let json = provider(&mock_server)
            .fetch_forecast(Coordinates {
                latitude: 52.52,
                longitude: 13.41,
            })
            .await
            .unwrap();

        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn forecast_error_status_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"reason\":\"Latitude must be in range\"}"))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .fetch_forecast(Coordinates {
                latitude: 500.0,
                longitude: 0.0,
            })
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("400"), "{msg}");
        assert!(msg.contains("Latitude must be in range"), "{msg}");
    }

    #[tokio::test]
    async fn search_returns_places() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Berlin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": 2950159, "name": "Berlin", "latitude": 52.52437, "longitude": 13.41053,
                     "country_code": "DE", "admin1": "Land Berlin"},
                    {"id": 5083330, "name": "Berlin", "latitude": 44.46867, "longitude": -71.18508}
                ],
                "generationtime_ms": 0.5
            })))
            .mount(&mock_server)
            .await;

        let places = provider(&mock_server).search("  Berlin ").await.unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].admin1.as_deref(), Some("Land Berlin"));
        assert_eq!(places[1].admin1, None);
        assert_eq!(places[1].id, 5083330);
    }

    #[tokio::test]
    async fn search_without_results_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generationtime_ms": 0.3
            })))
            .mount(&mock_server)
            .await;

        let places = provider(&mock_server).search("Nowhere").await.unwrap();
        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn blank_search_does_not_hit_the_network() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let places = provider(&mock_server).search("   ").await.unwrap();
        assert!(places.is_empty());
    }
}
