//! Core value types shared by the calculator, scanner and forecast layers.

use crate::error::{check_azimuth, check_coordinates, check_elevation};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Observation location in decimal degrees.
///
/// Construction validates the ranges, so every `GeoPoint` in circulation is usable
/// by the calculators without further checks.
///
/// # Example
/// ```
/// # use sun_exposure::GeoPoint;
/// let gothenburg = GeoPoint::new(57.7089, 11.9746).unwrap();
/// assert_eq!(gothenburg.latitude(), 57.7089);
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint", into = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = crate::Error;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl From<GeoPoint> for RawGeoPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

impl GeoPoint {
    /// Creates a validated point.
    ///
    /// # Errors
    /// Returns `InvalidLatitude` or `InvalidLongitude` for out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        check_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees (-90 to +90, positive north).
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees (-180 to +180, positive east).
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Sun position as seen from a point on the ground.
///
/// - Azimuth: 0° = North, measured clockwise to 360°
/// - Elevation: 90° = directly overhead, 0° = horizon, negative below the horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunPosition {
    azimuth: f64,
    elevation: f64,
    instant: DateTime<Utc>,
}

impl SunPosition {
    /// Creates a sun position from azimuth and elevation angles.
    ///
    /// # Errors
    /// Returns error if either angle is not finite or elevation is outside [-90, 90].
    ///
    /// # Example
    /// ```
    /// # use sun_exposure::SunPosition;
    /// # use chrono::{DateTime, Utc};
    /// let position = SunPosition::new(-90.0, 30.0, DateTime::<Utc>::UNIX_EPOCH).unwrap();
    /// assert_eq!(position.azimuth(), 270.0);
    /// assert_eq!(position.zenith_angle(), 60.0);
    /// assert!(position.is_sun_up());
    /// ```
    pub fn new(azimuth: f64, elevation: f64, instant: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            azimuth: check_azimuth(azimuth)?,
            elevation: check_elevation(elevation)?,
            instant,
        })
    }

    /// Azimuth angle in degrees (0° to 360°, 0° = North, increasing clockwise).
    #[must_use]
    pub const fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Elevation angle above the astronomical horizon in degrees.
    #[must_use]
    pub const fn elevation(&self) -> f64 {
        self.elevation
    }

    /// Zenith angle in degrees (90° − elevation).
    #[must_use]
    pub fn zenith_angle(&self) -> f64 {
        90.0 - self.elevation
    }

    /// The instant this position was computed for.
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Checks if the sun is above the horizon (elevation > 0°).
    #[must_use]
    pub fn is_sun_up(&self) -> bool {
        self.elevation > 0.0
    }
}

/// Predefined sun elevation angles for named daily events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Horizon {
    /// Sunrise/sunset: upper limb on the horizon, standard refraction (−0.833°)
    SunriseSunset,
    /// Bottom edge of the sun clears the horizon (−0.3°)
    SunriseEnd,
    /// Civil twilight (sun 6° below horizon)
    CivilTwilight,
    /// Nautical twilight (sun 12° below horizon)
    NauticalTwilight,
    /// Astronomical twilight (sun 18° below horizon)
    AstronomicalTwilight,
    /// Golden hour boundary (sun 6° above horizon)
    GoldenHour,
    /// Custom elevation angle
    Custom(f64),
}

impl Horizon {
    /// Gets the elevation angle in degrees for this horizon definition.
    #[must_use]
    pub const fn elevation_angle(&self) -> f64 {
        match self {
            Self::SunriseSunset => -0.833,
            Self::SunriseEnd => -0.3,
            Self::CivilTwilight => -6.0,
            Self::NauticalTwilight => -12.0,
            Self::AstronomicalTwilight => -18.0,
            Self::GoldenHour => 6.0,
            Self::Custom(angle) => *angle,
        }
    }

    /// Creates a custom horizon with the specified elevation angle.
    ///
    /// # Errors
    /// Returns `ComputationError` if elevation is outside -90 to +90 degrees.
    pub fn custom(elevation_degrees: f64) -> Result<Self> {
        Ok(Self::Custom(check_elevation(elevation_degrees)?))
    }
}

impl Eq for Horizon {}

impl core::hash::Hash for Horizon {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::SunriseSunset => 0.hash(state),
            Self::SunriseEnd => 1.hash(state),
            Self::CivilTwilight => 2.hash(state),
            Self::NauticalTwilight => 3.hash(state),
            Self::AstronomicalTwilight => 4.hash(state),
            Self::GoldenHour => 5.hash(state),
            Self::Custom(angle) => {
                6.hash(state);
                // +0.0 and -0.0 compare equal, so they must hash equally
                let normalized = if *angle == 0.0 { 0.0 } else { *angle };
                normalized.to_bits().hash(state);
            }
        }
    }
}

/// Crossing of one horizon on a given day.
///
/// At extreme latitudes the sun may never cross a given horizon; those days are
/// reported as `AllDay` or `AllNight` instead of carrying made-up times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SunriseResult<T> {
    /// Regular day with distinct rising, transit (noon), and setting times
    RegularDay {
        /// Time the sun rises through the horizon
        sunrise: T,
        /// Time of solar transit (solar noon)
        transit: T,
        /// Time the sun sets through the horizon
        sunset: T,
    },
    /// Sun stays above the horizon all day
    AllDay {
        /// Time of solar transit
        transit: T,
    },
    /// Sun stays below the horizon all day
    AllNight {
        /// Time of solar transit (highest, though still below the horizon)
        transit: T,
    },
}

impl<T> SunriseResult<T> {
    /// Gets the transit time (solar noon) for any result.
    pub const fn transit(&self) -> &T {
        match self {
            Self::RegularDay { transit, .. }
            | Self::AllDay { transit }
            | Self::AllNight { transit } => transit,
        }
    }

    /// Gets the rising time if this is a regular day.
    pub const fn sunrise(&self) -> Option<&T> {
        if let Self::RegularDay { sunrise, .. } = self {
            Some(sunrise)
        } else {
            None
        }
    }

    /// Gets the setting time if this is a regular day.
    pub const fn sunset(&self) -> Option<&T> {
        if let Self::RegularDay { sunset, .. } = self {
            Some(sunset)
        } else {
            None
        }
    }

    /// The daylight classification of this result.
    pub const fn daylight(&self) -> Daylight {
        match self {
            Self::RegularDay { .. } => Daylight::Regular,
            Self::AllDay { .. } => Daylight::AlwaysUp,
            Self::AllNight { .. } => Daylight::AlwaysDown,
        }
    }
}

/// Whether the sun rises and sets on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Daylight {
    /// Sun rises and sets.
    Regular,
    /// Polar day: the sun never sets.
    AlwaysUp,
    /// Polar night: the sun never rises.
    AlwaysDown,
}

/// Maximal contiguous stretch of direct sunlight, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SunnyInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl SunnyInterval {
    /// Creates an interval, or `None` if it would be empty or inverted.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// First sunlit instant.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the sunlit stretch.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the interval.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length of the interval in (fractional) minutes.
    #[must_use]
    pub fn minutes(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 60_000.0
    }
}

/// Snapshot answer for "where is the sun and does it reach this point right now".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunExposure {
    /// Sun position at the requested instant.
    pub position: SunPosition,
    /// Whether the point receives direct, unobstructed sunlight.
    pub sunlit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_geo_point_validation() {
        let point = GeoPoint::new(57.7089, 11.9746).unwrap();
        assert_eq!(point.latitude(), 57.7089);
        assert_eq!(point.longitude(), 11.9746);

        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.1, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 180.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_geo_point_deserialization_validates() {
        let point: GeoPoint =
            serde_json::from_str(r#"{"latitude": 57.7, "longitude": 11.97}"#).unwrap();
        assert_eq!(point.latitude(), 57.7);

        let bad = serde_json::from_str::<GeoPoint>(r#"{"latitude": 100.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_horizon_elevation_angles() {
        assert_eq!(Horizon::SunriseSunset.elevation_angle(), -0.833);
        assert_eq!(Horizon::SunriseEnd.elevation_angle(), -0.3);
        assert_eq!(Horizon::CivilTwilight.elevation_angle(), -6.0);
        assert_eq!(Horizon::NauticalTwilight.elevation_angle(), -12.0);
        assert_eq!(Horizon::AstronomicalTwilight.elevation_angle(), -18.0);
        assert_eq!(Horizon::GoldenHour.elevation_angle(), 6.0);
        assert_eq!(Horizon::custom(-3.0).unwrap().elevation_angle(), -3.0);

        assert!(Horizon::custom(-95.0).is_err());
        assert!(Horizon::custom(f64::NAN).is_err());
    }

    #[test]
    fn test_horizon_hash_normalizes_zero_sign() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Horizon::Custom(0.0));
        set.insert(Horizon::Custom(-0.0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_sun_position_creation() {
        let pos = SunPosition::new(180.0, 45.0, noon()).unwrap();
        assert_eq!(pos.azimuth(), 180.0);
        assert_eq!(pos.elevation(), 45.0);
        assert_eq!(pos.zenith_angle(), 45.0);
        assert_eq!(pos.instant(), noon());
        assert!(pos.is_sun_up());

        let on_horizon = SunPosition::new(450.0, 0.0, noon()).unwrap();
        assert_eq!(on_horizon.azimuth(), 90.0);
        assert!(!on_horizon.is_sun_up());

        assert!(SunPosition::new(0.0, 91.0, noon()).is_err());
        assert!(SunPosition::new(f64::NAN, 10.0, noon()).is_err());
    }

    #[test]
    fn test_sunrise_result_accessors() {
        let sunrise = noon() - Duration::hours(6);
        let sunset = noon() + Duration::hours(6);
        let regular = SunriseResult::RegularDay {
            sunrise,
            transit: noon(),
            sunset,
        };
        assert_eq!(regular.daylight(), Daylight::Regular);
        assert_eq!(regular.sunrise(), Some(&sunrise));
        assert_eq!(regular.sunset(), Some(&sunset));
        assert_eq!(regular.transit(), &noon());

        let polar_day = SunriseResult::AllDay { transit: noon() };
        assert_eq!(polar_day.daylight(), Daylight::AlwaysUp);
        assert_eq!(polar_day.sunrise(), None);

        let polar_night = SunriseResult::AllNight { transit: noon() };
        assert_eq!(polar_night.daylight(), Daylight::AlwaysDown);
        assert_eq!(polar_night.sunset(), None);
        assert_eq!(polar_night.transit(), &noon());
    }

    #[test]
    fn test_sunny_interval() {
        let interval = SunnyInterval::new(noon(), noon() + Duration::minutes(90)).unwrap();
        assert_eq!(interval.duration(), Duration::minutes(90));
        assert!((interval.minutes() - 90.0).abs() < 1e-9);

        assert!(SunnyInterval::new(noon(), noon()).is_none());
        assert!(SunnyInterval::new(noon(), noon() - Duration::seconds(1)).is_none());
    }
}
