//! Error types for the sun exposure engine.

use crate::math::normalize_degrees_0_to_360;

/// Result type alias for operations in this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while validating input or computing sun exposure.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid latitude value (must be between -90 and +90 degrees).
    #[error("invalid latitude {value}° (must be between -90° and +90°)")]
    InvalidLatitude {
        /// The invalid latitude value provided.
        value: f64,
    },
    /// Invalid longitude value (must be between -180 and +180 degrees).
    #[error("invalid longitude {value}° (must be between -180° and +180°)")]
    InvalidLongitude {
        /// The invalid longitude value provided.
        value: f64,
    },
    /// Instant that cannot be parsed or represented.
    #[error("invalid instant: {message}")]
    InvalidInstant {
        /// Description of the instant constraint violation.
        message: &'static str,
    },
    /// Calendar date that cannot be represented or stepped over.
    #[error("invalid date: {message}")]
    InvalidDate {
        /// Description of the date constraint violation.
        message: &'static str,
    },
    /// Obstruction with a non-finite field.
    #[error("invalid obstruction #{index}: {message}")]
    InvalidObstruction {
        /// Position of the obstruction in the caller's list.
        index: usize,
        /// Description of the problem.
        message: &'static str,
    },
    /// Obstruction set larger than the configured bound.
    #[error("too many obstructions: {count} (at most {max} allowed)")]
    TooManyObstructions {
        /// Number of obstructions supplied.
        count: usize,
        /// Configured upper bound.
        max: usize,
    },
    /// Engine or scanner configuration out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration problem.
        message: String,
    },
    /// Numerical computation error (e.g., non-finite intermediate value).
    #[error("computation error: {message}")]
    ComputationError {
        /// Description of the computation error.
        message: &'static str,
    },
}

impl Error {
    /// Creates an invalid latitude error.
    #[must_use]
    pub const fn invalid_latitude(value: f64) -> Self {
        Self::InvalidLatitude { value }
    }

    /// Creates an invalid longitude error.
    #[must_use]
    pub const fn invalid_longitude(value: f64) -> Self {
        Self::InvalidLongitude { value }
    }

    /// Creates an invalid instant error.
    #[must_use]
    pub const fn invalid_instant(message: &'static str) -> Self {
        Self::InvalidInstant { message }
    }

    /// Creates an invalid date error.
    #[must_use]
    pub const fn invalid_date(message: &'static str) -> Self {
        Self::InvalidDate { message }
    }

    /// Creates an invalid obstruction error.
    #[must_use]
    pub const fn invalid_obstruction(index: usize, message: &'static str) -> Self {
        Self::InvalidObstruction { index, message }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a computation error.
    #[must_use]
    pub const fn computation_error(message: &'static str) -> Self {
        Self::ComputationError { message }
    }

    /// Whether the error stems from caller input rather than from the engine.
    ///
    /// Boundary layers map these to a 4xx-style rejection.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        !matches!(self, Self::ComputationError { .. })
    }
}

/// Validates latitude is within the valid range (-90 to +90 degrees).
///
/// # Errors
/// Returns `InvalidLatitude` if latitude is outside -90 to +90 degrees or not finite.
pub fn check_latitude(latitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::invalid_latitude(latitude));
    }
    Ok(())
}

/// Validates longitude is within the valid range (-180 to +180 degrees).
///
/// # Errors
/// Returns `InvalidLongitude` if longitude is outside -180 to +180 degrees or not finite.
pub fn check_longitude(longitude: f64) -> Result<()> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::invalid_longitude(longitude));
    }
    Ok(())
}

/// Validates both latitude and longitude are within valid ranges.
///
/// # Errors
/// Returns `InvalidLatitude` or `InvalidLongitude` for out-of-range coordinates.
pub fn check_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    check_latitude(latitude)?;
    check_longitude(longitude)?;
    Ok(())
}

/// Validates and normalizes an azimuth angle to the range [0, 360) degrees.
///
/// # Errors
/// Returns `ComputationError` if azimuth is not finite.
pub fn check_azimuth(azimuth: f64) -> Result<f64> {
    if !azimuth.is_finite() {
        return Err(Error::computation_error("azimuth is not finite"));
    }
    Ok(normalize_degrees_0_to_360(azimuth))
}

/// Validates an elevation angle to be within the range [-90, 90] degrees.
///
/// # Errors
/// Returns `ComputationError` if elevation is not finite or outside the valid range.
pub fn check_elevation(elevation: f64) -> Result<f64> {
    if !elevation.is_finite() {
        return Err(Error::computation_error("elevation angle is not finite"));
    }
    if !(-90.0..=90.0).contains(&elevation) {
        return Err(Error::computation_error(
            "elevation angle must be between -90° and 90°",
        ));
    }
    Ok(elevation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_validation() {
        assert!(check_latitude(0.0).is_ok());
        assert!(check_latitude(90.0).is_ok());
        assert!(check_latitude(-90.0).is_ok());
        assert!(check_latitude(57.7089).is_ok());

        assert!(check_latitude(91.0).is_err());
        assert!(check_latitude(-91.0).is_err());
        assert!(check_latitude(f64::NAN).is_err());
        assert!(check_latitude(f64::INFINITY).is_err());
    }

    #[test]
    fn test_longitude_validation() {
        assert!(check_longitude(0.0).is_ok());
        assert!(check_longitude(180.0).is_ok());
        assert!(check_longitude(-180.0).is_ok());
        assert!(check_longitude(11.9746).is_ok());

        assert!(check_longitude(181.0).is_err());
        assert!(check_longitude(-181.0).is_err());
        assert!(check_longitude(f64::NAN).is_err());
        assert!(check_longitude(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = Error::invalid_latitude(95.0);
        assert_eq!(
            err.to_string(),
            "invalid latitude 95° (must be between -90° and +90°)"
        );

        let err = Error::TooManyObstructions { count: 300, max: 256 };
        assert_eq!(
            err.to_string(),
            "too many obstructions: 300 (at most 256 allowed)"
        );

        let err = Error::invalid_config("sampling step must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration: sampling step must be positive"
        );
    }

    #[test]
    fn test_input_error_classification() {
        assert!(Error::invalid_longitude(200.0).is_input_error());
        assert!(Error::invalid_obstruction(2, "height is not finite").is_input_error());
        assert!(!Error::computation_error("diverged").is_input_error());
    }

    #[test]
    fn test_check_azimuth() {
        assert_eq!(check_azimuth(-90.0).unwrap(), 270.0);
        assert_eq!(check_azimuth(450.0).unwrap(), 90.0);
        assert_eq!(check_azimuth(360.0).unwrap(), 0.0);

        assert!(check_azimuth(f64::NAN).is_err());
        assert!(check_azimuth(f64::INFINITY).is_err());
    }

    #[test]
    fn test_check_elevation() {
        assert!(check_elevation(0.0).is_ok());
        assert!(check_elevation(90.0).is_ok());
        assert!(check_elevation(-90.0).is_ok());

        assert!(check_elevation(-90.5).is_err());
        assert!(check_elevation(f64::NAN).is_err());
    }
}
