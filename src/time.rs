//! Time-related helpers: UTC day boundaries and ΔT (Delta T) estimation.
//!
//! All solar math in this crate runs on UTC. A calendar date is interpreted as
//! the UTC day `[00:00, 24:00)`; presenting results in a venue's local zone is
//! the caller's concern.

#![allow(clippy::unreadable_literal)]

use crate::math::polynomial;
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Milliseconds in one day.
const MS_PER_DAY: f64 = 86_400_000.0;

/// Returns midnight UTC at the start of `date`.
#[must_use]
pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Adds a (possibly negative or > 1) fraction of a day to midnight UTC of `date`.
///
/// # Errors
/// Returns `InvalidInstant` if the fraction is not finite or the result overflows.
pub fn add_fraction_of_day(date: NaiveDate, fraction: f64) -> Result<DateTime<Utc>> {
    if !fraction.is_finite() {
        return Err(Error::invalid_instant("day fraction is not finite"));
    }
    let millis = (MS_PER_DAY * fraction).round() as i64;
    utc_midnight(date)
        .checked_add_signed(Duration::milliseconds(millis))
        .ok_or(Error::invalid_instant("instant out of range"))
}

/// Returns the date `days` after `date`.
///
/// # Errors
/// Returns `InvalidDate` if the result is outside chrono's supported range.
pub fn add_days(date: NaiveDate, days: u32) -> Result<NaiveDate> {
    date.checked_add_days(chrono::Days::new(u64::from(days)))
        .ok_or(Error::invalid_date("date out of range"))
}

/// Floors an instant to a bucket of `bucket_seconds`, returning the bucket index.
#[must_use]
pub fn time_bucket(instant: DateTime<Utc>, bucket_seconds: u32) -> i64 {
    instant.timestamp().div_euclid(i64::from(bucket_seconds.max(1)))
}

/// Parses an RFC 3339 timestamp into a UTC instant.
///
/// # Errors
/// Returns `InvalidInstant` for unparseable input.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::invalid_instant("not an RFC 3339 timestamp"))
}

/// Builds a UTC instant from Unix seconds.
///
/// # Errors
/// Returns `InvalidInstant` for non-finite or out-of-range values.
pub fn instant_from_unix_seconds(seconds: f64) -> Result<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(Error::invalid_instant("timestamp is not finite"));
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
        .ok_or(Error::invalid_instant("timestamp out of range"))
}

/// ΔT (Delta T) estimation.
///
/// ΔT is the difference between Terrestrial Time (TT) and Universal Time (UT1).
/// Estimates follow the Espenak & Meeus polynomial fits (2014 update) for
/// -500–3000 and their long-term parabola elsewhere.
pub struct DeltaT;

impl DeltaT {
    /// Estimates ΔT in seconds for a given decimal year.
    ///
    /// # Errors
    /// Returns `InvalidInstant` if the year is not finite.
    ///
    /// # Example
    /// ```
    /// # use sun_exposure::time::DeltaT;
    /// let delta_t = DeltaT::estimate(2024.0).unwrap();
    /// assert!(delta_t > 60.0 && delta_t < 80.0);
    /// ```
    pub fn estimate(decimal_year: f64) -> Result<f64> {
        let year = decimal_year;
        if !year.is_finite() {
            return Err(Error::invalid_instant("year must be finite"));
        }

        let delta_t = if year < -500.0 || year > 3000.0 {
            let u = (year - 1820.0) / 100.0;
            polynomial(&[-20.0, 0.0, 32.0], u)
        } else if year < 500.0 {
            let u = year / 100.0;
            polynomial(
                &[10583.6, -1014.41, 33.78311, -5.952053, -0.1798452, 0.022174192, 0.0090316521],
                u,
            )
        } else if year < 1600.0 {
            let u = (year - 1000.0) / 100.0;
            polynomial(
                &[1574.2, -556.01, 71.23472, 0.319781, -0.8503463, -0.005050998, 0.0083572073],
                u,
            )
        } else if year < 1700.0 {
            let t = year - 1600.0;
            polynomial(&[120.0, -0.9808, -0.01532, 1.0 / 7129.0], t)
        } else if year < 1800.0 {
            let t = year - 1700.0;
            polynomial(&[8.83, 0.1603, -0.0059285, 0.00013336, -1.0 / 1_174_000.0], t)
        } else if year < 1860.0 {
            let t = year - 1800.0;
            polynomial(
                &[
                    13.72,
                    -0.332447,
                    0.0068612,
                    0.0041116,
                    -0.00037436,
                    0.0000121272,
                    -0.0000001699,
                    0.000000000875,
                ],
                t,
            )
        } else if year < 1900.0 {
            let t = year - 1860.0;
            polynomial(
                &[7.62, 0.5737, -0.251754, 0.01680668, -0.0004473624, 1.0 / 233_174.0],
                t,
            )
        } else if year < 1920.0 {
            let t = year - 1900.0;
            polynomial(&[-2.79, 1.494119, -0.0598939, 0.0061966, -0.000197], t)
        } else if year < 1941.0 {
            let t = year - 1920.0;
            polynomial(&[21.20, 0.84493, -0.076100, 0.0020936], t)
        } else if year < 1961.0 {
            let t = year - 1950.0;
            polynomial(&[29.07, 0.407, -1.0 / 233.0, 1.0 / 2547.0], t)
        } else if year < 1986.0 {
            let t = year - 1975.0;
            polynomial(&[45.45, 1.067, -1.0 / 260.0, -1.0 / 718.0], t)
        } else if year < 2005.0 {
            let t = year - 2000.0;
            polynomial(
                &[63.86, 0.3345, -0.060374, 0.0017275, 0.000651814, 0.00002373599],
                t,
            )
        } else if year < 2015.0 {
            let t = year - 2005.0;
            polynomial(&[64.69, 0.2930], t)
        } else {
            let t = year - 2015.0;
            polynomial(&[67.62, 0.3645, 0.0039755], t)
        };

        Ok(delta_t)
    }

    /// Estimates ΔT from any date-like value, using the middle of its month.
    ///
    /// # Errors
    /// Propagates errors from [`DeltaT::estimate`].
    #[allow(clippy::needless_pass_by_value)]
    pub fn estimate_from_date_like<D: Datelike>(date: D) -> Result<f64> {
        let decimal_year = f64::from(date.year()) + (f64::from(date.month()) - 0.5) / 12.0;
        Self::estimate(decimal_year)
    }
}
