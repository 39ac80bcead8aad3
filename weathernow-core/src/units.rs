//! Unit preferences and the conversions used when rendering.
//!
//! Forecasts are always fetched in metric units; conversion happens only at
//! presentation time.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    #[default]
    Kmh,
    Mph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationUnit {
    #[default]
    Mm,
    Inch,
}

/// The three independent unit choices a user can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UnitSettings {
    pub temperature: TemperatureUnit,
    pub wind_speed: WindSpeedUnit,
    pub precipitation: PrecipitationUnit,
}

/// How many of the settings belong to each measurement system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemCount {
    pub metric: u8,
    pub imperial: u8,
}

impl UnitSettings {
    pub const METRIC: UnitSettings = UnitSettings {
        temperature: TemperatureUnit::Celsius,
        wind_speed: WindSpeedUnit::Kmh,
        precipitation: PrecipitationUnit::Mm,
    };

    pub const IMPERIAL: UnitSettings = UnitSettings {
        temperature: TemperatureUnit::Fahrenheit,
        wind_speed: WindSpeedUnit::Mph,
        precipitation: PrecipitationUnit::Inch,
    };

    /// Settings a "switch system" action should move to: all-metric when
    /// imperial units dominate, otherwise all-imperial.
    pub fn switch_target(&self) -> UnitSettings {
        let count = count_systems(self);
        if count.metric < count.imperial {
            Self::METRIC
        } else {
            Self::IMPERIAL
        }
    }

    pub fn temperature(&self, celsius: f64) -> f64 {
        convert_temperature(self.temperature, celsius)
    }

    pub fn wind_speed(&self, kmh: f64) -> f64 {
        convert_wind_speed(self.wind_speed, kmh)
    }

    pub fn precipitation(&self, mm: f64) -> f64 {
        convert_precipitation(self.precipitation, mm)
    }
}

pub fn count_systems(settings: &UnitSettings) -> SystemCount {
    let metric = [
        settings.temperature == TemperatureUnit::Celsius,
        settings.wind_speed == WindSpeedUnit::Kmh,
        settings.precipitation == PrecipitationUnit::Mm,
    ]
    .into_iter()
    .filter(|is_metric| *is_metric)
    .count() as u8;

    SystemCount {
        metric,
        imperial: 3 - metric,
    }
}

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn to_miles_per_hour(kmh: f64) -> f64 {
    kmh / 1.609
}

pub fn to_inches(mm: f64) -> f64 {
    mm / 25.4
}

pub fn convert_temperature(unit: TemperatureUnit, celsius: f64) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => to_fahrenheit(celsius),
    }
}

pub fn convert_wind_speed(unit: WindSpeedUnit, kmh: f64) -> f64 {
    match unit {
        WindSpeedUnit::Kmh => kmh,
        WindSpeedUnit::Mph => to_miles_per_hour(kmh),
    }
}

pub fn convert_precipitation(unit: PrecipitationUnit, mm: f64) -> f64 {
    match unit {
        PrecipitationUnit::Mm => mm,
        PrecipitationUnit::Inch => to_inches(mm),
    }
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }
}

impl WindSpeedUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindSpeedUnit::Kmh => "kmh",
            WindSpeedUnit::Mph => "mph",
        }
    }

    /// Short suffix used when printing a value.
    pub fn symbol(&self) -> &'static str {
        match self {
            WindSpeedUnit::Kmh => "km/h",
            WindSpeedUnit::Mph => "mph",
        }
    }
}

impl PrecipitationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrecipitationUnit::Mm => "mm",
            PrecipitationUnit::Inch => "inch",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            PrecipitationUnit::Mm => "mm",
            PrecipitationUnit::Inch => "in",
        }
    }
}

impl fmt::Display for UnitSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "temperature: {}, wind speed: {}, precipitation: {}",
            self.temperature.as_str(),
            self.wind_speed.as_str(),
            self.precipitation.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_conversion() {
        assert_eq!(to_fahrenheit(0.0), 32.0);
        assert_eq!(to_fahrenheit(100.0), 212.0);
        assert_eq!(to_fahrenheit(-100.0), -148.0);
        assert!((to_fahrenheit(1.0) - 33.8).abs() < 1e-9);
        assert!((to_fahrenheit(-1.0) - 30.2).abs() < 1e-9);
    }

    #[test]
    fn wind_and_precipitation_conversion() {
        assert_eq!(to_miles_per_hour(0.0), 0.0);
        assert!((to_miles_per_hour(100.0) - 62.15040397762586).abs() < 1e-9);
        assert_eq!(to_inches(0.0), 0.0);
        assert!((to_inches(100.0) - 3.937007874015748).abs() < 1e-9);
    }

    #[test]
    fn metric_units_are_identity() {
        let settings = UnitSettings::default();
        assert_eq!(settings.temperature(21.5), 21.5);
        assert_eq!(settings.wind_speed(100.0), 100.0);
        assert_eq!(settings.precipitation(100.0), 100.0);
    }

    #[test]
    fn count_systems_for_mixed_settings() {
        assert_eq!(
            count_systems(&UnitSettings::METRIC),
            SystemCount { metric: 3, imperial: 0 }
        );
        assert_eq!(
            count_systems(&UnitSettings::IMPERIAL),
            SystemCount { metric: 0, imperial: 3 }
        );

        let mixed = UnitSettings {
            temperature: TemperatureUnit::Fahrenheit,
            wind_speed: WindSpeedUnit::Kmh,
            precipitation: PrecipitationUnit::Inch,
        };
        assert_eq!(count_systems(&mixed), SystemCount { metric: 1, imperial: 2 });

        let mixed = UnitSettings {
            wind_speed: WindSpeedUnit::Mph,
            ..UnitSettings::METRIC
        };
        assert_eq!(count_systems(&mixed), SystemCount { metric: 2, imperial: 1 });
    }

    #[test]
    fn switch_target_follows_majority() {
        assert_eq!(UnitSettings::METRIC.switch_target(), UnitSettings::IMPERIAL);
        assert_eq!(UnitSettings::IMPERIAL.switch_target(), UnitSettings::METRIC);

        let mostly_metric = UnitSettings {
            precipitation: PrecipitationUnit::Inch,
            ..UnitSettings::METRIC
        };
        assert_eq!(mostly_metric.switch_target(), UnitSettings::IMPERIAL);
    }

    #[test]
    fn settings_toml_uses_lowercase_names() {
        let toml = toml::to_string(&UnitSettings::IMPERIAL).unwrap();
        assert!(toml.contains("temperature = \"fahrenheit\""));
        assert!(toml.contains("wind_speed = \"mph\""));
        assert!(toml.contains("precipitation = \"inch\""));
    }
}
