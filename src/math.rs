//! Angle helpers shared by the position, times and occlusion code.

/// Mathematical constants
pub const PI: f64 = core::f64::consts::PI;

/// Converts degrees to radians.
#[inline]
pub const fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Converts radians to degrees.
#[inline]
pub const fn radians_to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Normalizes an angle in degrees to the range [0, 360).
pub fn normalize_degrees_0_to_360(degrees: f64) -> f64 {
    let normalized = degrees % 360.0;
    if normalized < 0.0 {
        normalized + 360.0
    } else {
        normalized
    }
}

/// Wraps an angle in radians into [-π, π).
pub fn wrap_radians_pi(radians: f64) -> f64 {
    let mut h = ((radians + PI) % (2.0 * PI)) - PI;
    if h < -PI {
        h += 2.0 * PI;
    }
    h
}

/// Absolute difference between two compass bearings, in [0, 180] degrees.
pub fn angular_difference(a: f64, b: f64) -> f64 {
    (normalize_degrees_0_to_360(a - b + 180.0) - 180.0).abs()
}

/// Computes a polynomial using Horner's method for numerical stability.
///
/// Coefficients are ordered [a₀, a₁, a₂, ...] for a₀ + a₁x + a₂x² + ...
pub fn polynomial(coeffs: &[f64], x: f64) -> f64 {
    let Some(&last) = coeffs.last() else {
        return 0.0;
    };

    let mut result = last;
    for &coeff in coeffs.iter().rev().skip(1) {
        result = result.mul_add(x, coeff);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_degree_radian_conversion() {
        assert!((degrees_to_radians(180.0) - PI).abs() < EPSILON);
        assert!((degrees_to_radians(90.0) - PI / 2.0).abs() < EPSILON);
        assert!((radians_to_degrees(PI) - 180.0).abs() < EPSILON);
    }

    #[test]
    fn test_normalize_degrees_0_to_360() {
        assert_eq!(normalize_degrees_0_to_360(0.0), 0.0);
        assert_eq!(normalize_degrees_0_to_360(360.0), 0.0);
        assert_eq!(normalize_degrees_0_to_360(450.0), 90.0);
        assert_eq!(normalize_degrees_0_to_360(-90.0), 270.0);
        assert_eq!(normalize_degrees_0_to_360(-360.0), 0.0);
    }

    #[test]
    fn test_wrap_radians_pi() {
        assert!((wrap_radians_pi(0.0)).abs() < EPSILON);
        assert!((wrap_radians_pi(3.0 * PI / 2.0) + PI / 2.0).abs() < EPSILON);
        assert!((wrap_radians_pi(-3.0 * PI / 2.0) - PI / 2.0).abs() < EPSILON);
        assert!((wrap_radians_pi(10.0 * PI + 0.25) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_angular_difference() {
        assert!((angular_difference(180.0, 180.0)).abs() < EPSILON);
        assert!((angular_difference(10.0, 350.0) - 20.0).abs() < EPSILON);
        assert!((angular_difference(350.0, 10.0) - 20.0).abs() < EPSILON);
        assert!((angular_difference(0.0, 180.0) - 180.0).abs() < EPSILON);
        assert!((angular_difference(300.0, 180.0) - 120.0).abs() < EPSILON);
    }

    #[test]
    fn test_polynomial() {
        assert_eq!(polynomial(&[], 5.0), 0.0);
        assert_eq!(polynomial(&[3.0], 5.0), 3.0);
        assert_eq!(polynomial(&[2.0, 3.0], 4.0), 14.0);
        assert!((polynomial(&[1.0, 2.0, 3.0], 2.0) - 17.0).abs() < EPSILON);
    }
}
