//! Box obstructions around an observation point and the occlusion predicate.
//!
//! An obstruction is a simplified rectangular building described relative to the point:
//! compass bearing and horizontal distance from the point to the obstruction, plus its
//! height. The blocking test is a 2D silhouette check: the sun must be within 90° of the
//! obstruction's bearing, and lower than the angle subtended by its top edge.
//!
//! Footprint width, length and orientation are carried for callers (map rendering, later
//! refinement) but do not take part in the blocking decision.

use crate::error::Error;
use crate::math::{angular_difference, normalize_degrees_0_to_360, radians_to_degrees};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Maximum bearing difference at which an obstruction can still sit between point and sun.
const MAX_BLOCKING_BEARING_DIFFERENCE: f64 = 90.0;

/// A nearby structure modelled as a box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstruction {
    /// Height above the observation point in meters.
    pub height_meters: f64,
    /// Footprint width in meters (not used for blocking).
    #[serde(default)]
    pub width_meters: f64,
    /// Footprint length in meters (not used for blocking).
    #[serde(default)]
    pub length_meters: f64,
    /// Orientation of the footprint's long axis, degrees clockwise from north (not used for blocking).
    #[serde(default)]
    pub orientation_degrees: f64,
    /// Horizontal distance from the point to the obstruction in meters.
    pub distance_meters: f64,
    /// Compass bearing from the point to the obstruction, degrees clockwise from north.
    pub direction_degrees: f64,
}

impl Obstruction {
    /// Creates an obstruction, normalizing bearings into [0, 360).
    ///
    /// Non-positive height or distance is accepted (see [`Obstruction::is_degenerate`]);
    /// only non-finite values are rejected.
    ///
    /// # Errors
    /// Returns `InvalidObstruction` if any field is NaN or infinite.
    pub fn new(
        height_meters: f64,
        width_meters: f64,
        length_meters: f64,
        orientation_degrees: f64,
        distance_meters: f64,
        direction_degrees: f64,
    ) -> Result<Self> {
        let obstruction = Self {
            height_meters,
            width_meters,
            length_meters,
            orientation_degrees,
            distance_meters,
            direction_degrees,
        };
        obstruction.check(0)?;
        Ok(obstruction.normalized())
    }

    /// Shorthand for an obstruction with no footprint information.
    ///
    /// # Errors
    /// Returns `InvalidObstruction` if any value is not finite.
    pub fn at(height_meters: f64, distance_meters: f64, direction_degrees: f64) -> Result<Self> {
        Self::new(height_meters, 0.0, 0.0, 0.0, distance_meters, direction_degrees)
    }

    fn normalized(mut self) -> Self {
        self.direction_degrees = normalize_degrees_0_to_360(self.direction_degrees);
        self.orientation_degrees = normalize_degrees_0_to_360(self.orientation_degrees);
        self
    }

    fn check(&self, index: usize) -> Result<()> {
        let fields = [
            (self.height_meters, "height is not finite"),
            (self.width_meters, "width is not finite"),
            (self.length_meters, "length is not finite"),
            (self.orientation_degrees, "orientation is not finite"),
            (self.distance_meters, "distance is not finite"),
            (self.direction_degrees, "direction is not finite"),
        ];
        for (value, message) in fields {
            if !value.is_finite() {
                return Err(Error::invalid_obstruction(index, message));
            }
        }
        Ok(())
    }

    /// A zero or negative height or distance cannot shade anything.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.height_meters <= 0.0 || self.distance_meters <= 0.0
    }

    /// Minimum sun elevation (degrees) needed to clear the obstruction's top edge.
    #[must_use]
    pub fn required_elevation(&self) -> f64 {
        radians_to_degrees(self.height_meters.atan2(self.distance_meters))
    }

    /// Whether this obstruction blocks a sun at the given azimuth and elevation.
    ///
    /// Degenerate obstructions never block.
    ///
    /// # Example
    /// ```
    /// # use sun_exposure::Obstruction;
    /// // 20 m tall, 20 m due south: needs 45° of elevation to clear
    /// let building = Obstruction::at(20.0, 20.0, 180.0).unwrap();
    /// assert!(building.blocks_sun(180.0, 30.0));
    /// assert!(!building.blocks_sun(180.0, 60.0));
    /// assert!(!building.blocks_sun(300.0, 30.0));
    /// ```
    #[must_use]
    pub fn blocks_sun(&self, sun_azimuth: f64, sun_elevation: f64) -> bool {
        if self.is_degenerate() {
            return false;
        }
        if angular_difference(sun_azimuth, self.direction_degrees) > MAX_BLOCKING_BEARING_DIFFERENCE
        {
            return false;
        }
        sun_elevation < self.required_elevation()
    }
}

/// Whether no obstruction in the set can ever block the sun (empty or all degenerate).
#[must_use]
pub fn casts_no_shadow(obstructions: &[Obstruction]) -> bool {
    obstructions.iter().all(Obstruction::is_degenerate)
}

/// Validates an obstruction set before it reaches the sampler.
///
/// Degenerate entries are kept (they are harmless to the predicate) but reported with
/// a warning, so that malformed venue data is visible in the logs.
///
/// # Errors
/// Returns `TooManyObstructions` if the set exceeds `max`, or `InvalidObstruction` for
/// the first entry with a non-finite field.
pub fn validate_obstructions(obstructions: &[Obstruction], max: usize) -> Result<()> {
    if obstructions.len() > max {
        return Err(Error::TooManyObstructions {
            count: obstructions.len(),
            max,
        });
    }
    for (index, obstruction) in obstructions.iter().enumerate() {
        obstruction.check(index)?;
        if obstruction.is_degenerate() {
            tracing::warn!(
                index,
                height_meters = obstruction.height_meters,
                distance_meters = obstruction.distance_meters,
                "degenerate obstruction ignored for blocking"
            );
        }
    }
    Ok(())
}

/// Stable fingerprint of an obstruction set, used to key cached sunlight verdicts.
#[must_use]
pub fn fingerprint(obstructions: &[Obstruction]) -> u64 {
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    obstructions.len().hash(&mut hasher);
    for o in obstructions {
        for value in [
            o.height_meters,
            o.width_meters,
            o.length_meters,
            o.orientation_degrees,
            o.distance_meters,
            normalize_degrees_0_to_360(o.direction_degrees),
        ] {
            // +0.0 and -0.0 describe the same geometry
            let value = if value == 0.0 { 0.0 } else { value };
            value.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}
