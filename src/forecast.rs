//! Multi-day sunshine forecast.
//!
//! Runs the interval scanner over consecutive UTC dates and derives per-day statistics.
//! The number of days is clamped to a configured bound, since sampling cost grows
//! linearly with it.

use crate::obstruction::Obstruction;
use crate::scanner::{sunny_intervals_for, total_minutes};
use crate::time::add_days;
use crate::times::{SunTimes, sun_times};
use crate::{Daylight, GeoPoint, Result, SunnyInterval};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

/// Reference upper bound on forecast length.
pub const DEFAULT_MAX_DAYS: u32 = 14;

/// Sunshine statistics for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayForecast {
    /// UTC calendar date.
    pub date: NaiveDate,
    /// Whether the sun rises and sets on this date.
    pub daylight: Daylight,
    /// Sunrise, `None` under polar conditions.
    pub sunrise: Option<DateTime<Utc>>,
    /// Sunset, `None` under polar conditions.
    pub sunset: Option<DateTime<Utc>>,
    /// Sunny intervals in chronological order.
    pub sunny_periods: Vec<SunnyInterval>,
    /// Share of the daylight window in direct sun, 0..=100.
    pub sunshine_percentage: u8,
    /// Total length of `sunny_periods` in minutes.
    pub sunshine_minutes: f64,
    /// Length of the daylight window in minutes.
    pub day_length_minutes: f64,
}

impl DayForecast {
    /// Derives the day's statistics from its sun times and sunny intervals.
    #[must_use]
    pub fn from_parts(times: &SunTimes, sunny_periods: Vec<SunnyInterval>) -> Self {
        let day_length_minutes = times.day_length_minutes();
        let sunshine_minutes = total_minutes(&sunny_periods);
        Self {
            date: times.date,
            daylight: times.daylight,
            sunrise: times.sunrise,
            sunset: times.sunset,
            sunshine_percentage: sunshine_percentage(sunshine_minutes, day_length_minutes),
            sunny_periods,
            sunshine_minutes,
            day_length_minutes,
        }
    }
}

fn sunshine_percentage(sunshine_minutes: f64, day_length_minutes: f64) -> u8 {
    if day_length_minutes <= 0.0 || sunshine_minutes <= 0.0 {
        return 0;
    }
    (100.0 * sunshine_minutes / day_length_minutes)
        .round()
        .clamp(0.0, 100.0) as u8
}

/// Forecast for `days` consecutive dates starting at `start_date`, at most `max_days`.
///
/// `days == 0` yields an empty forecast.
///
/// # Errors
/// Propagates calculator and scanner errors, and `InvalidDate` when the range runs past
/// the supported calendar.
///
/// # Example
/// ```
/// use sun_exposure::{GeoPoint, forecast, scanner};
/// use chrono::NaiveDate;
///
/// let point = GeoPoint::new(57.7089, 11.9746).unwrap();
/// let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let days = forecast::forecast(&point, &[], start, 30, scanner::default_step(), 14).unwrap();
/// assert_eq!(days.len(), 14);
/// assert!(days.iter().all(|d| d.sunshine_percentage == 100));
/// ```
#[tracing::instrument(level = "debug", skip(point, obstructions, step), fields(obstructions = obstructions.len()))]
pub fn forecast(
    point: &GeoPoint,
    obstructions: &[Obstruction],
    start_date: NaiveDate,
    days: u32,
    step: Duration,
    max_days: u32,
) -> Result<Vec<DayForecast>> {
    forecast_with(start_date, days, max_days, |date| {
        let times = sun_times(point, date)?;
        let intervals = sunny_intervals_for(point, &times, obstructions, step)?;
        Ok((times, intervals))
    })
}

/// Forecast driver over an arbitrary per-date source of sun times and intervals.
///
/// # Errors
/// Propagates errors from `day` and `InvalidDate` for out-of-range dates.
pub fn forecast_with<F>(
    start_date: NaiveDate,
    days: u32,
    max_days: u32,
    mut day: F,
) -> Result<Vec<DayForecast>>
where
    F: FnMut(NaiveDate) -> Result<(SunTimes, Vec<SunnyInterval>)>,
{
    let clamped = days.min(max_days);
    if clamped < days {
        tracing::debug!(requested = days, clamped, "forecast length clamped");
    }

    (0..clamped)
        .map(|offset| {
            let date = add_days(start_date, offset)?;
            let (times, intervals) = day(date)?;
            Ok(DayForecast::from_parts(&times, intervals))
        })
        .collect()
}

/// Aggregate over a forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    /// Number of forecast days.
    pub days: usize,
    /// Sum of sunshine minutes over all days.
    pub total_sunshine_minutes: f64,
    /// Mean of the daily sunshine percentages, 0 for an empty forecast.
    pub mean_sunshine_percentage: f64,
    /// Date with the most sunshine minutes (earliest on ties).
    pub sunniest_date: Option<NaiveDate>,
}

impl ForecastSummary {
    /// Summarizes a list of day forecasts.
    #[must_use]
    pub fn from_days(days: &[DayForecast]) -> Self {
        let total_sunshine_minutes = days.iter().map(|d| d.sunshine_minutes).sum();
        let mean_sunshine_percentage = if days.is_empty() {
            0.0
        } else {
            days.iter()
                .map(|d| f64::from(d.sunshine_percentage))
                .sum::<f64>()
                / days.len() as f64
        };
        let sunniest_date = days
            .iter()
            .fold(None::<&DayForecast>, |best, d| match best {
                Some(b) if b.sunshine_minutes >= d.sunshine_minutes => Some(b),
                _ => Some(d),
            })
            .filter(|d| d.sunshine_minutes > 0.0)
            .map(|d| d.date);

        Self {
            days: days.len(),
            total_sunshine_minutes,
            mean_sunshine_percentage,
            sunniest_date,
        }
    }
}
