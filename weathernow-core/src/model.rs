use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::interpretation::WeatherCode;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A geocoding search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
}

impl Place {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// "Name, Region" when the region is known.
    pub fn label(&self) -> String {
        match &self.admin1 {
            Some(admin1) if !admin1.is_empty() => format!("{}, {admin1}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// Result of reverse geocoding a coordinate pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub locality: Option<String>,
    pub country: Option<String>,
}

impl PlaceDetails {
    /// Non-empty parts joined by ", ", or `None` when there is nothing to show.
    pub fn label(&self) -> Option<String> {
        let parts: Vec<&str> = [self.locality.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Forecast payload after validation. Timestamps are still the provider's
/// values; daily ones are not trustworthy instants across DST changes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecastResponse {
    pub timezone: Tz,
    /// Offset in effect for the location when the forecast was produced.
    pub utc_offset: FixedOffset,
    pub current: RawCurrent,
    pub hourly: RawHourly,
    pub daily: RawDaily,
}

impl RawForecastResponse {
    pub fn utc_offset_seconds(&self) -> i32 {
        self.utc_offset.local_minus_utc()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawCurrent {
    pub time: DateTime<Utc>,
    pub temperature_2m: f64,
    pub weather_code: WeatherCode,
    pub apparent_temperature: f64,
    pub wind_speed_10m: f64,
    pub precipitation: f64,
    pub relative_humidity_2m: f64,
}

/// Parallel arrays; all of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawHourly {
    pub time: Vec<DateTime<Utc>>,
    pub temperature_2m: Vec<f64>,
    pub weather_code: Vec<WeatherCode>,
}

/// Parallel arrays; all of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawDaily {
    pub time: Vec<DateTime<Utc>>,
    pub weather_code: Vec<WeatherCode>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentRecord {
    pub time: DateTime<FixedOffset>,
    pub temperature_2m: f64,
    pub weather_code: WeatherCode,
    pub apparent_temperature: f64,
    pub wind_speed_10m: f64,
    pub precipitation: f64,
    pub relative_humidity_2m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub time: DateTime<FixedOffset>,
    pub temperature_2m: f64,
    pub weather_code: WeatherCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Local midnight, carrying the offset that applies on that date.
    pub time: DateTime<FixedOffset>,
    pub weather_code: WeatherCode,
    pub temperature_2m_max: f64,
    pub temperature_2m_min: f64,
}

/// Forecast view for a single location, trimmed to the visible week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWeather {
    pub timezone: String,
    pub utc_offset_seconds: i32,
    pub current: CurrentRecord,
    pub hourly: Vec<HourlyRecord>,
    pub daily: Vec<DailyRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_label_includes_region_when_present() {
        let mut place = Place {
            id: 1,
            name: "Berlin".into(),
            latitude: 52.52,
            longitude: 13.41,
            admin1: Some("Land Berlin".into()),
        };
        assert_eq!(place.label(), "Berlin, Land Berlin");

        place.admin1 = None;
        assert_eq!(place.label(), "Berlin");
    }

    #[test]
    fn place_details_label_skips_empty_parts() {
        let details = PlaceDetails {
            locality: Some("".into()),
            country: Some("Sweden".into()),
        };
        assert_eq!(details.label().as_deref(), Some("Sweden"));
        assert_eq!(PlaceDetails::default().label(), None);

        let details = PlaceDetails {
            locality: Some("Stockholm".into()),
            country: Some("Sweden".into()),
        };
        assert_eq!(details.label().as_deref(), Some("Stockholm, Sweden"));
    }
}
