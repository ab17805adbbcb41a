//! Numeric tolerances shared by every curve algorithm.
//!
//! All comparisons in this crate go through a single absolute tolerance so
//! that refinement, scattering and fitting agree on what "equal" means.

/// Absolute tolerance for comparing coordinates, knots and lengths.
pub const REAL_TOLERANCE: f64 = 1.0e-9;

/// Tolerance for squared lengths.
pub const SQUARE_REAL_TOLERANCE: f64 = REAL_TOLERANCE * REAL_TOLERANCE;

/// Returns `true` when `a` and `b` differ by no more than [`REAL_TOLERANCE`].
#[inline]
pub fn almost_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= REAL_TOLERANCE
}

/// Returns `true` when `a` is within [`REAL_TOLERANCE`] of zero.
#[inline]
pub fn almost_zero(a: f64) -> bool {
    a.abs() <= REAL_TOLERANCE
}

/// Sign of `x` as `1.0`, `-1.0` or `0.0`.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Angle of the vector `(x, y)` in the range `[0, 2*PI)`.
///
/// Returns `0.0` for a vector shorter than the tolerance.
pub fn compute_angle(x: f64, y: f64) -> f64 {
    let length = (x * x + y * y).sqrt();
    if length <= REAL_TOLERANCE {
        return 0.0;
    }

    let angle = (x / length).clamp(-1.0, 1.0).acos();
    if y < 0.0 {
        2.0 * std::f64::consts::PI - angle
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_almost_equal() {
        assert!(almost_equal(1.0, 1.0 + 1e-10));
        assert!(!almost_equal(1.0, 1.0 + 1e-8));
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-0.2), -1.0);
        assert_eq!(sign(0.0), 0.0);
    }

    #[test]
    fn test_compute_angle_quadrants() {
        assert_relative_eq!(compute_angle(1.0, 0.0), 0.0);
        assert_relative_eq!(compute_angle(0.0, 2.0), PI / 2.0);
        assert_relative_eq!(compute_angle(-3.0, 0.0), PI);
        assert_relative_eq!(compute_angle(0.0, -1.0), 3.0 * PI / 2.0);
        assert_relative_eq!(compute_angle(1.0, 1.0), PI / 4.0);
    }

    #[test]
    fn test_compute_angle_degenerate() {
        assert_eq!(compute_angle(0.0, 0.0), 0.0);
    }
}
