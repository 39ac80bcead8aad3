//! Plain-text rendering of forecasts, search hits and unit settings.

use anyhow::{Result, bail};
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::fmt::Write;
use weathernow_core::{
    DailyRecord, HourlyRecord, NormalizedWeather, Place, UnitSettings, WeatherCode,
};

/// Label shown when reverse geocoding produced nothing.
pub const UNKNOWN_LOCATION: &str = "Unknown";

fn whole(value: f64) -> f64 {
    // Avoid printing "-0".
    value.round() + 0.0
}

pub fn temperature(units: &UnitSettings, celsius: f64) -> String {
    format!("{:.0}°", whole(units.temperature(celsius)))
}

pub fn wind_speed(units: &UnitSettings, kmh: f64) -> String {
    format!("{:.0} {}", whole(units.wind_speed(kmh)), units.wind_speed.symbol())
}

pub fn precipitation(units: &UnitSettings, mm: f64) -> String {
    format!("{:.1} {}", units.precipitation(mm), units.precipitation.symbol())
}

pub fn humidity(percent: f64) -> String {
    format!("{:.0}%", whole(percent))
}

pub fn full_date(time: &DateTime<FixedOffset>) -> String {
    time.format("%A, %B %-d, %Y").to_string()
}

pub fn weekday(time: &DateTime<FixedOffset>) -> String {
    time.format("%a").to_string()
}

pub fn hour(time: &DateTime<FixedOffset>) -> String {
    time.format("%-I %p").to_string()
}

fn describe(code: WeatherCode) -> &'static str {
    code.interpretation().description
}

/// Hourly records that fall on the local calendar day `date`.
pub fn hours_on(hourly: &[HourlyRecord], date: NaiveDate) -> Vec<&HourlyRecord> {
    hourly.iter().filter(|h| h.time.date_naive() == date).collect()
}

/// Current conditions, the daily list, and the hours of the `day`-th daily entry.
pub fn forecast(
    label: &str,
    weather: &NormalizedWeather,
    units: &UnitSettings,
    day: usize,
) -> Result<String> {
    let selected: &DailyRecord = match weather.daily.get(day) {
        Some(record) => record,
        None if weather.daily.is_empty() => bail!("The forecast has no daily entries"),
        None => bail!(
            "Day {day} is out of range; choose 0 to {}",
            weather.daily.len() - 1
        ),
    };

    let mut out = String::new();
    let current = &weather.current;

    writeln!(out, "{label}")?;
    writeln!(out, "{} ({})", full_date(&current.time), weather.timezone)?;
    writeln!(
        out,
        "  {}  {} (feels like {})",
        describe(current.weather_code),
        temperature(units, current.temperature_2m),
        temperature(units, current.apparent_temperature),
    )?;
    writeln!(
        out,
        "  Humidity {}  Wind {}  Precipitation {}",
        humidity(current.relative_humidity_2m),
        wind_speed(units, current.wind_speed_10m),
        precipitation(units, current.precipitation),
    )?;

    writeln!(out)?;
    writeln!(out, "Daily")?;
    for (idx, record) in weather.daily.iter().enumerate() {
        let marker = if idx == day { '>' } else { ' ' };
        writeln!(
            out,
            "{marker} {:<4}{:<32}{} / {}",
            weekday(&record.time),
            describe(record.weather_code),
            temperature(units, record.temperature_2m_max),
            temperature(units, record.temperature_2m_min),
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Hourly, {}", selected.time.format("%A"))?;
    let hours = hours_on(&weather.hourly, selected.time.date_naive());
    if hours.is_empty() {
        writeln!(out, "  (no hourly data)")?;
    }
    for record in hours {
        writeln!(
            out,
            "  {:<7}{:<32}{}",
            hour(&record.time),
            describe(record.weather_code),
            temperature(units, record.temperature_2m),
        )?;
    }

    Ok(out)
}

pub fn places(places: &[Place]) -> String {
    if places.is_empty() {
        return "No places found.\n".to_string();
    }

    places
        .iter()
        .map(|p| format!("{}  ({:.2}, {:.2})\n", p.label(), p.latitude, p.longitude))
        .collect()
}

pub fn units(settings: &UnitSettings) -> String {
    format!(
        "Temperature:   {}\nWind speed:    {}\nPrecipitation: {}\n",
        settings.temperature.as_str(),
        settings.wind_speed.as_str(),
        settings.precipitation.as_str(),
    )
}
