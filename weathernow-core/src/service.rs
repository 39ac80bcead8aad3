//! The fetch → validate → normalize pipeline behind one handle.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::{
    Config,
    model::{Coordinates, NormalizedWeather, Place, PlaceDetails},
    normalize::normalize_forecast,
    provider::{
        ForecastProvider, GeocodingProvider, ReverseGeocoder, default_reverse_geocoder_from_config,
        http_client, open_meteo::OpenMeteo,
    },
    schema::validate_forecast_response,
};

#[derive(Debug)]
pub struct WeatherService {
    forecast: Box<dyn ForecastProvider>,
    geocoding: Box<dyn GeocodingProvider>,
    reverse: Box<dyn ReverseGeocoder>,
}

impl WeatherService {
    pub fn new(
        forecast: Box<dyn ForecastProvider>,
        geocoding: Box<dyn GeocodingProvider>,
        reverse: Box<dyn ReverseGeocoder>,
    ) -> Self {
        Self {
            forecast,
            geocoding,
            reverse,
        }
    }

    /// Wire up Open-Meteo and the configured reverse geocoder.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = http_client(config)?;
        let open_meteo = OpenMeteo::new(
            http.clone(),
            &config.endpoints.forecast,
            &config.endpoints.geocoding,
        );
        let reverse = default_reverse_geocoder_from_config(config, http)?;

        Ok(Self::new(Box::new(open_meteo.clone()), Box::new(open_meteo), reverse))
    }

    pub async fn search(&self, name: &str) -> Result<Vec<Place>> {
        self.geocoding.search(name).await
    }

    /// Fetch, validate and normalize the forecast for `coords` as seen at `now`.
    ///
    /// A payload that fails validation surfaces as a
    /// [`ValidationError`](crate::schema::ValidationError) inside the returned
    /// error and can be recovered with `downcast_ref`.
    pub async fn forecast(&self, coords: Coordinates, now: DateTime<Utc>) -> Result<NormalizedWeather> {
        let json = self.forecast.fetch_forecast(coords).await?;
        let raw = validate_forecast_response(&json)?;
        Ok(normalize_forecast(&raw, now))
    }

    /// Best-effort place label for `coords`. Failures are logged, never returned.
    pub async fn locate(&self, coords: Coordinates) -> Option<PlaceDetails> {
        match self.reverse.locate(coords).await {
            Ok(details) => details,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "reverse geocoding failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Canned(serde_json::Value);

    #[async_trait]
    impl ForecastProvider for Canned {
        async fn fetch_forecast(&self, _coords: Coordinates) -> Result<serde_json::Value> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct NoPlaces;

    #[async_trait]
    impl GeocodingProvider for NoPlaces {
        async fn search(&self, _name: &str) -> Result<Vec<Place>> {
            Ok(Vec::new())
        }
    }

    #[derive(Debug)]
    struct Broken;

    #[async_trait]
    impl ReverseGeocoder for Broken {
        async fn locate(&self, _coords: Coordinates) -> Result<Option<PlaceDetails>> {
            Err(anyhow::anyhow!("connection reset"))
        }
    }

    const ORIGIN: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };

    #[tokio::test]
    async fn invalid_payload_yields_validation_error() {
        let payload = serde_json::json!({
            "timezone": "UTC",
            "utc_offset_seconds": 0,
            "current": {},
            "hourly": {},
            "daily": {}
        });
        let service = WeatherService::new(Box::new(Canned(payload)), Box::new(NoPlaces), Box::new(Broken));

        let err = service.forecast(ORIGIN, Utc::now()).await.unwrap_err();

        assert!(err.downcast_ref::<crate::schema::ValidationError>().is_some());
    }

    #[tokio::test]
    async fn reverse_geocoding_failure_is_soft() {
        let service = WeatherService::new(
            Box::new(Canned(serde_json::Value::Null)),
            Box::new(NoPlaces),
            Box::new(Broken),
        );

        assert_eq!(service.locate(ORIGIN).await, None);
    }
}
