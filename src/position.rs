//! Sun position calculator.
//!
//! This follows the no. 3 algorithm described in Grena, 'Five new algorithms for the computation
//! of sun position from 2010 to 2110', Solar Energy 86 (2012) pp. 1323-1337: the apparent
//! ecliptic longitude is converted to right ascension/declination, then to local azimuth and
//! elevation. The algorithm is tuned for 2010-2110 (max error 0.01°) and degrades gracefully
//! outside that range, which is far below the tolerance of the occlusion model.
//!
//! No atmospheric refraction is applied: elevations are geometric (with parallax), so
//! `elevation <= 0` means the sun's centre is at or below the astronomical horizon.

#![allow(clippy::unreadable_literal)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use crate::math::{PI, degrees_to_radians, normalize_degrees_0_to_360, radians_to_degrees, wrap_radians_pi};
use crate::time::DeltaT;
use crate::{Error, GeoPoint, Result, SunPosition};
use chrono::{DateTime, Utc};

/// Unix day number of 2060-01-01 0h UT, the origin of Grena's day count.
const GRENA_EPOCH_UNIX_DAYS: f64 = 32_872.0;

/// Seconds per day.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Rate of change of the sun's hour angle, radians per day.
pub(crate) const HOUR_ANGLE_RATE: f64 = 2.0 * PI;

/// Geocentric equatorial coordinates of the sun, in radians.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Equatorial {
    pub right_ascension: f64,
    pub declination: f64,
}

/// Days since 2060-01-01 0h UT (Grena's `t`).
pub(crate) fn grena_day(instant: DateTime<Utc>) -> f64 {
    let seconds = instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) * 1e-9;
    seconds / SECONDS_PER_DAY - GRENA_EPOCH_UNIX_DAYS
}

/// Converts a Grena day count back to a UTC instant.
pub(crate) fn instant_from_grena_day(t: f64) -> Result<DateTime<Utc>> {
    let millis = ((t + GRENA_EPOCH_UNIX_DAYS) * SECONDS_PER_DAY * 1000.0).round();
    if !millis.is_finite() {
        return Err(Error::computation_error("event time is not finite"));
    }
    DateTime::from_timestamp_millis(millis as i64)
        .ok_or(Error::invalid_instant("event time out of range"))
}

/// Sun right ascension and declination at `t` days (UT) with ΔT in seconds.
pub(crate) fn equatorial(t: f64, delta_t: f64) -> Equatorial {
    let t_e = t + 1.1574e-5 * delta_t;
    let omega_at_e = 0.0172019715 * t_e;

    // Apparent sun longitude (lambda)
    let lambda = -1.388803
        + 1.720279216e-2 * t_e
        + 3.3366e-2 * (omega_at_e - 0.06172).sin()
        + 3.53e-4 * (2.0 * omega_at_e - 0.1163).sin();

    // Obliquity of the ecliptic (epsilon)
    let epsilon = 4.089567e-1 - 6.19e-9 * t_e;

    let s_lambda = lambda.sin();
    let c_lambda = lambda.cos();
    let s_epsilon = epsilon.sin();
    let c_epsilon = (1.0 - s_epsilon * s_epsilon).sqrt();

    let mut alpha = (s_lambda * c_epsilon).atan2(c_lambda);
    if alpha < 0.0 {
        alpha += 2.0 * PI;
    }

    Equatorial {
        right_ascension: alpha,
        declination: (s_lambda * s_epsilon).asin(),
    }
}

/// Local hour angle of the sun in radians, wrapped into [-π, π).
pub(crate) fn hour_angle(t: f64, longitude: f64, right_ascension: f64) -> f64 {
    wrap_radians_pi(
        1.7528311 + 6.300388099 * t + degrees_to_radians(longitude) - right_ascension,
    )
}

/// Calculates the sun position for a point and instant.
///
/// ΔT is estimated from the instant's year and month.
///
/// # Errors
/// Returns error if ΔT cannot be estimated or the result is not finite.
///
/// # Example
/// ```rust
/// use sun_exposure::{GeoPoint, position};
/// use chrono::{TimeZone, Utc};
///
/// let gothenburg = GeoPoint::new(57.7089, 11.9746).unwrap();
/// let instant = Utc.with_ymd_and_hms(2024, 6, 21, 11, 12, 0).unwrap();
/// let sun = position::solar_position(&gothenburg, instant).unwrap();
///
/// assert!(sun.elevation() > 50.0);
/// assert!((sun.azimuth() - 180.0).abs() < 5.0);
/// ```
pub fn solar_position(point: &GeoPoint, instant: DateTime<Utc>) -> Result<SunPosition> {
    let delta_t = DeltaT::estimate_from_date_like(instant)?;
    solar_position_with_delta_t(point, instant, delta_t)
}

/// Calculates the sun position with an explicit ΔT (seconds, TT − UT).
///
/// # Errors
/// Returns error if `delta_t` or an intermediate value is not finite.
pub fn solar_position_with_delta_t(
    point: &GeoPoint,
    instant: DateTime<Utc>,
    delta_t: f64,
) -> Result<SunPosition> {
    if !delta_t.is_finite() {
        return Err(Error::invalid_instant("ΔT is not finite"));
    }

    let t = grena_day(instant);
    let eq = equatorial(t, delta_t);
    let h = hour_angle(t, point.longitude(), eq.right_ascension);

    // Topocentric coordinates
    let s_phi = degrees_to_radians(point.latitude()).sin();
    let c_phi = (1.0 - s_phi * s_phi).sqrt();
    let s_delta = eq.declination.sin();
    let c_delta = (1.0 - s_delta * s_delta).sqrt();
    let s_h = h.sin();
    let c_h = h.cos();

    let s_epsilon0 = s_phi * s_delta + c_phi * c_delta * c_h;
    let e_p = s_epsilon0.asin() - 4.26e-5 * (1.0 - s_epsilon0 * s_epsilon0).sqrt();
    let gamma = s_h.atan2(c_h * s_phi - s_delta * c_phi / c_delta);

    let azimuth = normalize_degrees_0_to_360(radians_to_degrees(gamma + PI));
    let elevation = radians_to_degrees(e_p);

    SunPosition::new(azimuth, elevation, instant)
}
