//! Named daily sun events (sunrise, sunset, twilights, golden hour, solar noon, nadir).
//!
//! Events are computed for the solar day whose transit falls closest to noon of the
//! requested UTC date at the point's longitude, so for far-east or far-west points the
//! rising or setting time may land on the neighbouring UTC date.
//!
//! Polar conditions are reported, never invented: a horizon the sun does not cross that
//! day yields `None` for both of its events, and [`SunTimes::daylight`] says whether the
//! sun stays up or down around the clock.

#![allow(clippy::similar_names)]

use crate::math::degrees_to_radians;
use crate::position::{HOUR_ANGLE_RATE, equatorial, grena_day, hour_angle, instant_from_grena_day};
use crate::time::{DeltaT, add_days, utc_midnight};
use crate::types::{Daylight, Horizon, SunriseResult};
use crate::{Error, GeoPoint, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Refinement passes for transit and rise/set times.
const ITERATIONS: usize = 3;

/// Named sun events for one point and one UTC calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SunTimes {
    /// The UTC date these events were computed for.
    pub date: NaiveDate,
    /// Rise/set classification for the standard sunrise/sunset horizon.
    pub daylight: Daylight,
    /// Solar transit, the sun's highest point.
    pub solar_noon: DateTime<Utc>,
    /// Lowest point of the sun, half a day before solar noon.
    pub nadir: DateTime<Utc>,
    /// Top edge of the sun appears on the horizon.
    pub sunrise: Option<DateTime<Utc>>,
    /// Bottom edge of the sun clears the horizon.
    pub sunrise_end: Option<DateTime<Utc>>,
    /// Morning golden hour ends.
    pub golden_hour_end: Option<DateTime<Utc>>,
    /// Evening golden hour starts.
    pub golden_hour: Option<DateTime<Utc>>,
    /// Bottom edge of the sun touches the horizon.
    pub sunset_start: Option<DateTime<Utc>>,
    /// Sun disappears below the horizon.
    pub sunset: Option<DateTime<Utc>>,
    /// Morning civil twilight starts.
    pub dawn: Option<DateTime<Utc>>,
    /// Evening civil twilight ends.
    pub dusk: Option<DateTime<Utc>>,
    /// Morning nautical twilight starts.
    pub nautical_dawn: Option<DateTime<Utc>>,
    /// Evening nautical twilight ends.
    pub nautical_dusk: Option<DateTime<Utc>>,
    /// Morning astronomical twilight starts (night ends).
    pub night_end: Option<DateTime<Utc>>,
    /// Evening astronomical twilight ends (night starts).
    pub night: Option<DateTime<Utc>>,
}

impl SunTimes {
    /// The stretch of the day during which the sun can be above the horizon.
    ///
    /// Regular days give `[sunrise, sunset]`; a polar day gives the whole UTC date
    /// `[00:00, 24:00)`; a polar night gives `None`.
    #[must_use]
    pub fn daylight_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self.daylight {
            Daylight::Regular => self.sunrise.zip(self.sunset),
            Daylight::AlwaysUp => {
                let start = utc_midnight(self.date);
                let end = add_days(self.date, 1).ok().map(utc_midnight)?;
                Some((start, end))
            }
            Daylight::AlwaysDown => None,
        }
    }

    /// Day length in (fractional) minutes: sunrise to sunset, 1440 for a polar day,
    /// 0 for a polar night.
    #[must_use]
    pub fn day_length_minutes(&self) -> f64 {
        self.daylight_window().map_or(0.0, |(start, end)| {
            (end - start).num_milliseconds() as f64 / 60_000.0
        })
    }
}

/// Computes all named sun events for `point` on the UTC calendar `date`.
///
/// # Errors
/// Returns error if the date is out of the supported range.
///
/// # Example
/// ```rust
/// use sun_exposure::{Daylight, GeoPoint, times};
/// use chrono::NaiveDate;
///
/// let gothenburg = GeoPoint::new(57.7089, 11.9746).unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
/// let sun_times = times::sun_times(&gothenburg, date).unwrap();
///
/// assert_eq!(sun_times.daylight, Daylight::Regular);
/// assert!(sun_times.sunrise.unwrap() < sun_times.solar_noon);
/// // no astronomical night around midsummer at 57.7°N
/// assert!(sun_times.night.is_none());
/// ```
pub fn sun_times(point: &GeoPoint, date: NaiveDate) -> Result<SunTimes> {
    let delta_t = DeltaT::estimate_from_date_like(date)?;
    let transit_t = transit_day(point, date, delta_t);
    let transit = instant_from_grena_day(transit_t)?;
    let nadir = transit - chrono::Duration::hours(12);

    let main = horizon_crossing(point, transit_t, delta_t, Horizon::SunriseSunset)?;
    let pair = |horizon| -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let result = horizon_crossing(point, transit_t, delta_t, horizon)?;
        Ok((result.sunrise().copied(), result.sunset().copied()))
    };

    let (sunrise_end, sunset_start) = pair(Horizon::SunriseEnd)?;
    let (golden_hour_end, golden_hour) = pair(Horizon::GoldenHour)?;
    let (dawn, dusk) = pair(Horizon::CivilTwilight)?;
    let (nautical_dawn, nautical_dusk) = pair(Horizon::NauticalTwilight)?;
    let (night_end, night) = pair(Horizon::AstronomicalTwilight)?;

    Ok(SunTimes {
        date,
        daylight: main.daylight(),
        solar_noon: transit,
        nadir,
        sunrise: main.sunrise().copied(),
        sunrise_end,
        golden_hour_end,
        golden_hour,
        sunset_start,
        sunset: main.sunset().copied(),
        dawn,
        dusk,
        nautical_dawn,
        nautical_dusk,
        night_end,
        night,
    })
}

/// Calculates rise, transit and set for a single horizon on the UTC `date`.
///
/// # Errors
/// Returns error if the date is out of the supported range or an event time overflows.
pub fn sunrise_sunset_for_horizon(
    point: &GeoPoint,
    date: NaiveDate,
    horizon: Horizon,
) -> Result<SunriseResult<DateTime<Utc>>> {
    let delta_t = DeltaT::estimate_from_date_like(date)?;
    let transit_t = transit_day(point, date, delta_t);
    horizon_crossing(point, transit_t, delta_t, horizon)
}

/// Transit closest to local noon of `date`, as a Grena day count.
fn transit_day(point: &GeoPoint, date: NaiveDate, delta_t: f64) -> f64 {
    let mut t = grena_day(utc_midnight(date)) + 0.5 - point.longitude() / 360.0;
    for _ in 0..ITERATIONS {
        let eq = equatorial(t, delta_t);
        t -= hour_angle(t, point.longitude(), eq.right_ascension) / HOUR_ANGLE_RATE;
    }
    t
}

/// Argument of the hour-angle arccos for a given declination and horizon elevation.
///
/// Values below −1 mean the sun never drops to the horizon, above +1 that it never
/// reaches it.
fn hour_angle_cosine(latitude: f64, declination: f64, elevation_angle: f64) -> f64 {
    let phi = degrees_to_radians(latitude);
    let h0 = degrees_to_radians(elevation_angle);
    (h0.sin() - phi.sin() * declination.sin()) / (phi.cos() * declination.cos())
}

fn horizon_crossing(
    point: &GeoPoint,
    transit_t: f64,
    delta_t: f64,
    horizon: Horizon,
) -> Result<SunriseResult<DateTime<Utc>>> {
    let transit = instant_from_grena_day(transit_t)?;
    let elevation_angle = horizon.elevation_angle();
    let declination = equatorial(transit_t, delta_t).declination;

    let cos_h0 = hour_angle_cosine(point.latitude(), declination, elevation_angle);
    if cos_h0.is_nan() {
        return Err(Error::computation_error("hour angle is undefined"));
    }
    if cos_h0 < -1.0 {
        return Ok(SunriseResult::AllDay { transit });
    }
    if cos_h0 > 1.0 {
        return Ok(SunriseResult::AllNight { transit });
    }

    let rise_t = refine_crossing(point, transit_t, delta_t, elevation_angle, -1.0);
    let set_t = refine_crossing(point, transit_t, delta_t, elevation_angle, 1.0);

    Ok(SunriseResult::RegularDay {
        sunrise: instant_from_grena_day(rise_t)?,
        transit,
        sunset: instant_from_grena_day(set_t)?,
    })
}

/// Iterates the crossing time on one side of transit (`side` = −1 rising, +1 setting),
/// re-evaluating the declination at each estimate.
fn refine_crossing(
    point: &GeoPoint,
    transit_t: f64,
    delta_t: f64,
    elevation_angle: f64,
    side: f64,
) -> f64 {
    let mut t = transit_t;
    for _ in 0..ITERATIONS {
        let eq = equatorial(t, delta_t);
        let cos_h0 = hour_angle_cosine(point.latitude(), eq.declination, elevation_angle)
            .clamp(-1.0, 1.0);
        let h0 = cos_h0.acos();
        // target hour angle relative to the actual hour angle at `t`
        let current = hour_angle(t, point.longitude(), eq.right_ascension);
        let target = side * h0;
        let mut delta = target - current;
        if delta.abs() > core::f64::consts::PI {
            delta -= delta.signum() * 2.0 * core::f64::consts::PI;
        }
        t += delta / HOUR_ANGLE_RATE;
    }
    t
}
