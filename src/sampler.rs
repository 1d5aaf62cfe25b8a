//! "Is this point in direct sunlight right now?"
//!
//! Binary in/out-of-sun model: the sun must be above the horizon and no obstruction may
//! block it. Partial shading is not modelled.

use crate::obstruction::Obstruction;
use crate::position::solar_position;
use crate::{GeoPoint, Result, SunExposure, SunPosition};
use chrono::{DateTime, Utc};

/// Verdict for an already computed sun position.
///
/// Below or on the horizon is always shaded; otherwise sunlit unless any single
/// obstruction blocks the sun.
#[must_use]
pub fn is_sunlit_at(position: &SunPosition, obstructions: &[Obstruction]) -> bool {
    if !position.is_sun_up() {
        return false;
    }
    !obstructions
        .iter()
        .any(|o| o.blocks_sun(position.azimuth(), position.elevation()))
}

/// Whether `point` receives direct sunlight at `instant`.
///
/// # Errors
/// Propagates errors from the position calculator.
///
/// # Example
/// ```
/// use sun_exposure::{GeoPoint, sampler};
/// use chrono::{TimeZone, Utc};
///
/// let gothenburg = GeoPoint::new(57.7089, 11.9746).unwrap();
/// let before_dawn = Utc.with_ymd_and_hms(2024, 12, 21, 6, 0, 0).unwrap();
/// assert!(!sampler::is_sunlit(&gothenburg, before_dawn, &[]).unwrap());
/// ```
pub fn is_sunlit(
    point: &GeoPoint,
    instant: DateTime<Utc>,
    obstructions: &[Obstruction],
) -> Result<bool> {
    let position = solar_position(point, instant)?;
    Ok(is_sunlit_at(&position, obstructions))
}

/// Sun position plus the sunlight verdict for one instant.
///
/// # Errors
/// Propagates errors from the position calculator.
pub fn exposure(
    point: &GeoPoint,
    instant: DateTime<Utc>,
    obstructions: &[Obstruction],
) -> Result<SunExposure> {
    let position = solar_position(point, instant)?;
    Ok(SunExposure {
        position,
        sunlit: is_sunlit_at(&position, obstructions),
    })
}
