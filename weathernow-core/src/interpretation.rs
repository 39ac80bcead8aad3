//! WMO weather interpretation codes.
//!
//! See <https://open-meteo.com/en/docs#weather_variable_documentation>.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable meaning of a weather code, plus the icon used to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    pub description: &'static str,
    pub icon: &'static str,
}

impl Interpretation {
    /// Rendered when a code is outside the table.
    pub const PLACEHOLDER: Interpretation = Interpretation {
        description: "Unknown conditions",
        icon: "icon-placeholder",
    };
}

const fn entry(code: u8, description: &'static str, icon: &'static str) -> (u8, Interpretation) {
    (code, Interpretation { description, icon })
}

// Sorted by code; looked up with a binary search.
static TABLE: [(u8, Interpretation); 28] = [
    entry(0, "Clear sky", "icon-sunny"),
    entry(1, "Mainly clear", "icon-partly-cloudy"),
    entry(2, "Partly cloudy", "icon-partly-cloudy"),
    entry(3, "Overcast", "icon-overcast"),
    entry(45, "Fog", "icon-fog"),
    entry(48, "Depositing rime fog", "icon-fog"),
    entry(51, "Light drizzle", "icon-drizzle"),
    entry(53, "Moderate drizzle", "icon-drizzle"),
    entry(55, "Dense drizzle", "icon-drizzle"),
    entry(56, "Light freezing drizzle", "icon-drizzle"),
    entry(57, "Dense freezing drizzle", "icon-drizzle"),
    entry(61, "Slight rain", "icon-rain"),
    entry(63, "Moderate rain", "icon-rain"),
    entry(65, "Heavy rain", "icon-rain"),
    entry(66, "Light freezing rain", "icon-rain"),
    entry(67, "Heavy freezing rain", "icon-rain"),
    entry(71, "Slight snow fall", "icon-snow"),
    entry(73, "Moderate snow fall", "icon-snow"),
    entry(75, "Heavy snow fall", "icon-snow"),
    entry(77, "Snow grains", "icon-snow"),
    entry(80, "Slight rain showers", "icon-rain"),
    entry(81, "Moderate rain showers", "icon-rain"),
    entry(82, "Violent rain showers", "icon-rain"),
    entry(85, "Slight snow showers", "icon-snow"),
    entry(86, "Heavy snow showers", "icon-snow"),
    entry(95, "Thunderstorm", "icon-storm"),
    entry(96, "Thunderstorm with slight hail", "icon-storm"),
    entry(99, "Thunderstorm with heavy hail", "icon-storm"),
];

fn find(code: i64) -> Option<&'static Interpretation> {
    let code = u8::try_from(code).ok()?;
    TABLE
        .binary_search_by_key(&code, |(c, _)| *c)
        .ok()
        .map(|idx| &TABLE[idx].1)
}

/// Look up the interpretation of a raw weather code.
///
/// Returns `None` for codes outside the WMO table. That is not an error for
/// the caller: it should draw [`Interpretation::PLACEHOLDER`] instead.
pub fn lookup_interpretation(code: i64) -> Option<&'static Interpretation> {
    let found = find(code);
    if found.is_none() {
        tracing::warn!(code, "unknown WMO weather code");
    }
    found
}

/// Same as [`lookup_interpretation`], falling back to the placeholder.
pub fn interpretation_or_placeholder(code: i64) -> &'static Interpretation {
    lookup_interpretation(code).unwrap_or(&Interpretation::PLACEHOLDER)
}

/// A weather code known to be part of the WMO table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct WeatherCode(u8);

impl WeatherCode {
    pub fn new(code: i64) -> Option<Self> {
        find(code)?;
        u8::try_from(code).ok().map(Self)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn interpretation(self) -> &'static Interpretation {
        find(i64::from(self.0)).unwrap_or(&Interpretation::PLACEHOLDER)
    }

    /// Every code in the table, ascending.
    pub fn all() -> impl Iterator<Item = WeatherCode> {
        TABLE.iter().map(|(code, _)| WeatherCode(*code))
    }
}

impl TryFrom<i64> for WeatherCode {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        WeatherCode::new(value).ok_or_else(|| format!("unknown WMO weather code {value}"))
    }
}

impl From<WeatherCode> for u8 {
    fn from(code: WeatherCode) -> Self {
        code.0
    }
}

impl fmt::Display for WeatherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(TABLE.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_codes_resolve() {
        assert_eq!(lookup_interpretation(0).unwrap().description, "Clear sky");
        assert_eq!(lookup_interpretation(3).unwrap().icon, "icon-overcast");
        assert_eq!(lookup_interpretation(99).unwrap().icon, "icon-storm");
    }

    #[test]
    fn unknown_code_is_none_and_does_not_panic() {
        assert!(lookup_interpretation(9999).is_none());
        assert!(lookup_interpretation(-1).is_none());
        assert!(lookup_interpretation(4).is_none());
    }

    #[test]
    fn placeholder_for_unknown_code() {
        assert_eq!(interpretation_or_placeholder(9999), &Interpretation::PLACEHOLDER);
        assert_eq!(interpretation_or_placeholder(45).description, "Fog");
    }

    #[test]
    fn weather_code_only_accepts_table_members() {
        assert!(WeatherCode::new(61).is_some());
        assert!(WeatherCode::new(62).is_none());
        assert!(WeatherCode::new(256).is_none());
        assert_eq!(WeatherCode::all().count(), 28);
    }

    #[test]
    fn weather_code_serde_is_transparent() {
        let code: WeatherCode = serde_json::from_str("80").unwrap();
        assert_eq!(code.value(), 80);
        assert_eq!(serde_json::to_string(&code).unwrap(), "80");
        assert!(serde_json::from_str::<WeatherCode>("7").is_err());
    }
}
