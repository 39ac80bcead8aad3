//! Turns a validated forecast into the records the presentation layer shows.
//!
//! The provider is asked for eight days so that a day lost or gained around a
//! DST change can be trimmed instead of shown. The visible window is the seven
//! local calendar days starting with the day that contains `now`.
//!
//! Hourly timestamps from the provider are correct instants. Daily timestamps
//! are not: they are local midnights encoded with the offset in effect when the
//! forecast was produced, even for days on the other side of a DST transition
//! (<https://github.com/open-meteo/open-meteo/issues/488>). Daily records are
//! therefore rebuilt from their wall-clock date.

use chrono::{
    DateTime, Days, FixedOffset, LocalResult, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

use crate::model::{
    CurrentRecord, DailyRecord, HourlyRecord, NormalizedWeather, RawDaily, RawForecastResponse,
    RawHourly,
};

/// Number of local calendar days surfaced to the user.
pub const WINDOW_DAYS: u64 = 7;

/// Number of days requested from the provider.
pub const FETCH_DAYS: u64 = WINDOW_DAYS + 1;

/// The visible part of a forecast, relative to one instant in one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastWindow {
    /// Local date containing `now`.
    pub first_day: NaiveDate,
    /// Last local date shown, `first_day + 6`.
    pub last_day: NaiveDate,
    /// Start of the local hour containing `now`.
    pub hour_start: DateTime<Utc>,
    /// Start of the local day after `last_day`; hourly entries must precede it.
    pub end: DateTime<Utc>,
}

impl ForecastWindow {
    pub fn new(tz: Tz, now: DateTime<Utc>) -> Self {
        let local = now.with_timezone(&tz);
        let first_day = local.date_naive();
        let last_day = first_day + Days::new(WINDOW_DAYS - 1);

        // Every offset in use is a whole number of minutes, so dropping the
        // local minutes and seconds lands on the local hour boundary.
        let hour_start = now
            - TimeDelta::minutes(i64::from(local.minute()))
            - TimeDelta::seconds(i64::from(local.second()))
            - TimeDelta::nanoseconds(i64::from(local.nanosecond()));

        let end = start_of_local_day(tz, last_day + Days::new(1)).with_timezone(&Utc);

        Self {
            first_day,
            last_day,
            hour_start,
            end,
        }
    }

    pub fn contains_hour(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.hour_start && instant < self.end
    }

    pub fn contains_day(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day
    }
}

/// First instant of `date` in `tz`.
///
/// Midnight can be skipped by a DST change (the day then starts at the end of
/// the gap) or occur twice (the earlier one is used).
pub fn start_of_local_day(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Inside a gap the wall clock still runs on the offset from before
            // the transition; a day earlier is safely on that side.
            let before = tz
                .offset_from_utc_datetime(&(midnight - TimeDelta::days(1)))
                .fix();
            let instant = midnight - TimeDelta::seconds(i64::from(before.local_minus_utc()));
            tz.from_utc_datetime(&instant)
        }
    }
}

/// Wall-clock date the provider meant for a daily timestamp.
///
/// Re-applying the forecast-time offset reproduces the provider's own
/// arithmetic, so the date comes out right even when the instant does not.
pub fn daily_wall_date(raw: DateTime<Utc>, fetch_offset: FixedOffset) -> NaiveDate {
    raw.with_timezone(&fetch_offset).date_naive()
}

/// Build the trimmed view of a validated forecast as seen at `now`.
///
/// # Panics
///
/// Panics if the parallel arrays of `raw` differ in length, which
/// [`validate_forecast_response`](crate::schema::validate_forecast_response)
/// rules out.
pub fn normalize_forecast(raw: &RawForecastResponse, now: DateTime<Utc>) -> NormalizedWeather {
    let tz = raw.timezone;
    let window = ForecastWindow::new(tz, now);

    let hourly = normalize_hourly(&raw.hourly, tz, &window);
    let daily = normalize_daily(&raw.daily, tz, raw.utc_offset, &window);

    tracing::debug!(
        timezone = %tz,
        first_day = %window.first_day,
        last_day = %window.last_day,
        hourly_in = raw.hourly.time.len(),
        hourly_out = hourly.len(),
        daily_in = raw.daily.time.len(),
        daily_out = daily.len(),
        "normalized forecast"
    );

    let current = &raw.current;
    NormalizedWeather {
        timezone: tz.name().to_string(),
        utc_offset_seconds: raw.utc_offset_seconds(),
        current: CurrentRecord {
            time: local_time(current.time, tz),
            temperature_2m: current.temperature_2m,
            weather_code: current.weather_code,
            apparent_temperature: current.apparent_temperature,
            wind_speed_10m: current.wind_speed_10m,
            precipitation: current.precipitation,
            relative_humidity_2m: current.relative_humidity_2m,
        },
        hourly,
        daily,
    }
}

fn local_time(instant: DateTime<Utc>, tz: Tz) -> DateTime<FixedOffset> {
    instant.with_timezone(&tz).fixed_offset()
}

fn normalize_hourly(hourly: &RawHourly, tz: Tz, window: &ForecastWindow) -> Vec<HourlyRecord> {
    let times = &hourly.time;
    let start = times
        .iter()
        .position(|t| *t >= window.hour_start)
        .unwrap_or(times.len());
    let end = times
        .iter()
        .position(|t| *t >= window.end)
        .unwrap_or(times.len())
        .max(start);

    (start..end)
        .map(|i| HourlyRecord {
            time: local_time(times[i], tz),
            temperature_2m: hourly.temperature_2m[i],
            weather_code: hourly.weather_code[i],
        })
        .collect()
}

fn normalize_daily(
    daily: &RawDaily,
    tz: Tz,
    fetch_offset: FixedOffset,
    window: &ForecastWindow,
) -> Vec<DailyRecord> {
    let dates: Vec<NaiveDate> = daily
        .time
        .iter()
        .map(|t| daily_wall_date(*t, fetch_offset))
        .collect();

    let start = dates
        .iter()
        .position(|d| *d >= window.first_day)
        .unwrap_or(dates.len());
    let end = dates
        .iter()
        .position(|d| *d > window.last_day)
        .unwrap_or(dates.len())
        .max(start);

    (start..end)
        .map(|i| DailyRecord {
            time: start_of_local_day(tz, dates[i]).fixed_offset(),
            weather_code: daily.weather_code[i],
            temperature_2m_max: daily.temperature_2m_max[i],
            temperature_2m_min: daily.temperature_2m_min[i],
        })
        .collect()
}
