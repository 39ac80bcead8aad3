use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::provider::{
    ReverseGeocoderId,
    azure_maps::DEFAULT_AZURE_MAPS_URL,
    nominatim::DEFAULT_NOMINATIM_URL,
    open_meteo::{DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL},
};
use crate::units::UnitSettings;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Base URLs of the upstream services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub geocoding: String,
    pub nominatim: String,
    pub azure_maps: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: DEFAULT_FORECAST_URL.to_string(),
            geocoding: DEFAULT_GEOCODING_URL.to_string(),
            nominatim: DEFAULT_NOMINATIM_URL.to_string(),
            azure_maps: DEFAULT_AZURE_MAPS_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Optional reverse geocoder id, "nominatim" or "azure".
    pub reverse_geocoder: Option<String>,

    /// Preferred display units.
    #[serde(default)]
    pub units: UnitSettings,

    #[serde(default)]
    pub endpoints: Endpoints,

    /// Example TOML:
    /// [providers.azure]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            reverse_geocoder: None,
            units: UnitSettings::default(),
            endpoints: Endpoints::default(),
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// Selected reverse geocoder; Nominatim when none is configured.
    pub fn reverse_geocoder_id(&self) -> Result<ReverseGeocoderId> {
        match &self.reverse_geocoder {
            Some(s) => ReverseGeocoderId::try_from(s.as_str()),
            None => Ok(ReverseGeocoderId::Nominatim),
        }
    }

    pub fn set_reverse_geocoder(&mut self, id: ReverseGeocoderId) {
        self.reverse_geocoder = Some(id.as_str().to_string());
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weathernow", "weathernow")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key; selects the provider if none is selected yet.
    pub fn upsert_provider_api_key(&mut self, provider_id: ReverseGeocoderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.reverse_geocoder.is_none() {
            self.reverse_geocoder = Some(provider_id.to_string());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ReverseGeocoderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ReverseGeocoderId) -> bool {
        !provider_id.requires_api_key() || self.provider_api_key(provider_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{TemperatureUnit, WindSpeedUnit};

    #[test]
    fn defaults_to_nominatim() {
        let cfg = Config::default();

        assert_eq!(cfg.reverse_geocoder_id().unwrap(), ReverseGeocoderId::Nominatim);
        assert!(cfg.is_provider_configured(ReverseGeocoderId::Nominatim));
        assert!(!cfg.is_provider_configured(ReverseGeocoderId::AzureMaps));
    }

    #[test]
    fn unknown_reverse_geocoder_is_an_error() {
        let cfg = Config {
            reverse_geocoder: Some("bing".into()),
            ..Config::default()
        };
        let err = cfg.reverse_geocoder_id().unwrap_err();

        assert!(err.to_string().contains("Unknown reverse geocoder"));
    }

    #[test]
    fn set_api_key_selects_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ReverseGeocoderId::AzureMaps, "AZ_KEY".into());

        assert_eq!(cfg.reverse_geocoder_id().unwrap(), ReverseGeocoderId::AzureMaps);
        assert_eq!(cfg.provider_api_key(ReverseGeocoderId::AzureMaps), Some("AZ_KEY"));
        assert!(cfg.is_provider_configured(ReverseGeocoderId::AzureMaps));
    }

    #[test]
    fn upsert_does_not_override_existing_selection() {
        let mut cfg = Config::default();
        cfg.set_reverse_geocoder(ReverseGeocoderId::Nominatim);

        cfg.upsert_provider_api_key(ReverseGeocoderId::AzureMaps, "AZ_KEY".into());

        assert_eq!(cfg.reverse_geocoder_id().unwrap(), ReverseGeocoderId::Nominatim);
        assert!(cfg.is_provider_configured(ReverseGeocoderId::AzureMaps));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [units]
            temperature = "fahrenheit"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.units.temperature, TemperatureUnit::Fahrenheit);
        assert_eq!(cfg.units.wind_speed, WindSpeedUnit::Kmh);
        assert_eq!(cfg.http_timeout_secs, 10);
        assert_eq!(cfg.endpoints, Endpoints::default());
        assert!(cfg.providers.is_empty());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config {
            units: UnitSettings::IMPERIAL,
            ..Config::default()
        };
        cfg.upsert_provider_api_key(ReverseGeocoderId::AzureMaps, "AZ_KEY".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.units, UnitSettings::IMPERIAL);
        assert_eq!(loaded.provider_api_key(ReverseGeocoderId::AzureMaps), Some("AZ_KEY"));
        assert_eq!(loaded.reverse_geocoder_id().unwrap(), ReverseGeocoderId::AzureMaps);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg.units, UnitSettings::default());
    }
}
