//! Validation of raw forecast payloads.
//!
//! The provider's JSON is checked field by field so that failures name the
//! exact path that was wrong. A single bad element rejects the whole payload.

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::interpretation::WeatherCode;
use crate::model::{RawCurrent, RawDaily, RawForecastResponse, RawHourly};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` has the wrong type: expected {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("field `{field}` holds unknown weather code {code}")]
    UnknownWeatherCode { field: String, code: i64 },

    #[error("`{section}` arrays differ in length: `{field}` has {actual} elements, `time` has {expected}")]
    LengthMismatch {
        section: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("field `timezone` is empty")]
    EmptyTimezone,

    #[error("`{0}` is not a known IANA timezone")]
    UnknownTimezone(String),

    #[error("utc offset of {0} seconds is out of range")]
    OffsetOutOfRange(i64),

    #[error("field `{field}` holds an unrepresentable timestamp {value}")]
    TimestampOutOfRange { field: String, value: i64 },
}

/// Check an arbitrary decoded JSON value against the forecast shape.
pub fn validate_forecast_response(raw: &Value) -> Result<RawForecastResponse, ValidationError> {
    let root = as_object(raw, "$")?;

    let tz_name = as_str(field(root, "", "timezone")?, "timezone")?;
    if tz_name.trim().is_empty() {
        return Err(ValidationError::EmptyTimezone);
    }
    let timezone: Tz = tz_name
        .parse()
        .map_err(|_| ValidationError::UnknownTimezone(tz_name.to_string()))?;

    let offset_seconds = as_i64(field(root, "", "utc_offset_seconds")?, "utc_offset_seconds")?;
    let utc_offset = i32::try_from(offset_seconds)
        .ok()
        .and_then(FixedOffset::east_opt)
        .ok_or(ValidationError::OffsetOutOfRange(offset_seconds))?;

    Ok(RawForecastResponse {
        timezone,
        utc_offset,
        current: validate_current(field(root, "", "current")?)?,
        hourly: validate_hourly(field(root, "", "hourly")?)?,
        daily: validate_daily(field(root, "", "daily")?)?,
    })
}

fn validate_current(value: &Value) -> Result<RawCurrent, ValidationError> {
    let obj = as_object(value, "current")?;
    let number = |name: &str| -> Result<f64, ValidationError> {
        let path = format!("current.{name}");
        as_finite(field(obj, "current", name)?, &path)
    };

    Ok(RawCurrent {
        time: as_timestamp(field(obj, "current", "time")?, "current.time")?,
        temperature_2m: number("temperature_2m")?,
        weather_code: as_weather_code(field(obj, "current", "weather_code")?, "current.weather_code")?,
        apparent_temperature: number("apparent_temperature")?,
        wind_speed_10m: number("wind_speed_10m")?,
        precipitation: number("precipitation")?,
        relative_humidity_2m: number("relative_humidity_2m")?,
    })
}

/// Validate the `hourly` block on its own.
pub fn validate_hourly(value: &Value) -> Result<RawHourly, ValidationError> {
    const SECTION: &str = "hourly";
    let obj = as_object(value, SECTION)?;

    let time = array_of(obj, SECTION, "time", as_timestamp)?;
    let temperature_2m = array_of(obj, SECTION, "temperature_2m", as_finite)?;
    let weather_code = array_of(obj, SECTION, "weather_code", as_weather_code)?;

    let expected = time.len();
    check_len(SECTION, "temperature_2m", expected, temperature_2m.len())?;
    check_len(SECTION, "weather_code", expected, weather_code.len())?;

    Ok(RawHourly {
        time,
        temperature_2m,
        weather_code,
    })
}

/// Validate the `daily` block on its own.
pub fn validate_daily(value: &Value) -> Result<RawDaily, ValidationError> {
    const SECTION: &str = "daily";
    let obj = as_object(value, SECTION)?;

    let time = array_of(obj, SECTION, "time", as_timestamp)?;
    let weather_code = array_of(obj, SECTION, "weather_code", as_weather_code)?;
    let temperature_2m_max = array_of(obj, SECTION, "temperature_2m_max", as_finite)?;
    let temperature_2m_min = array_of(obj, SECTION, "temperature_2m_min", as_finite)?;

    let expected = time.len();
    check_len(SECTION, "weather_code", expected, weather_code.len())?;
    check_len(SECTION, "temperature_2m_max", expected, temperature_2m_max.len())?;
    check_len(SECTION, "temperature_2m_min", expected, temperature_2m_min.len())?;

    Ok(RawDaily {
        time,
        weather_code,
        temperature_2m_max,
        temperature_2m_min,
    })
}

fn check_len(
    section: &'static str,
    field: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ValidationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ValidationError::LengthMismatch {
            section,
            field,
            expected,
            actual,
        })
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn field<'a>(obj: &'a Map<String, Value>, parent: &str, name: &str) -> Result<&'a Value, ValidationError> {
    obj.get(name).ok_or_else(|| ValidationError::MissingField {
        field: join(parent, name),
    })
}

fn array_of<T>(
    obj: &Map<String, Value>,
    section: &str,
    name: &str,
    element: impl Fn(&Value, &str) -> Result<T, ValidationError>,
) -> Result<Vec<T>, ValidationError> {
    let path = join(section, name);
    let items = field(obj, section, name)?
        .as_array()
        .ok_or_else(|| wrong_type(&path, "array"))?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| element(item, &format!("{path}[{idx}]")))
        .collect()
}

fn wrong_type(path: &str, expected: &'static str) -> ValidationError {
    ValidationError::WrongType {
        field: path.to_string(),
        expected,
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| wrong_type(path, "object"))
}

fn as_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| wrong_type(path, "string"))
}

fn as_i64(value: &Value, path: &str) -> Result<i64, ValidationError> {
    value.as_i64().ok_or_else(|| wrong_type(path, "integer"))
}

fn as_finite(value: &Value, path: &str) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| wrong_type(path, "finite number"))
}

fn as_timestamp(value: &Value, path: &str) -> Result<DateTime<Utc>, ValidationError> {
    let secs = as_i64(value, path)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| ValidationError::TimestampOutOfRange {
        field: path.to_string(),
        value: secs,
    })
}

fn as_weather_code(value: &Value, path: &str) -> Result<WeatherCode, ValidationError> {
    let code = as_i64(value, path)?;
    WeatherCode::new(code).ok_or_else(|| ValidationError::UnknownWeatherCode {
        field: path.to_string(),
        code,
    })
}
