//! 2D point type.

use num_traits::Float;
use std::ops::{Add, Div, Index, Mul, Neg, Sub};

/// A 2D point with x and y coordinates.
///
/// Doubles as a displacement: differences of points and scaled points are
/// represented by the same type, which is what the curve recursions need.
///
/// Generic over floating-point types (`f32` or `f64`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2<F> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Point2<F> {
    /// Creates a new point.
    #[inline]
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }

    /// Creates a point at the origin (0, 0).
    #[inline]
    pub fn origin() -> Self {
        Self {
            x: F::zero(),
            y: F::zero(),
        }
    }

    /// Computes the dot product with another point.
    #[inline]
    pub fn dot(self, other: Self) -> F {
        self.x * other.x + self.y * other.y
    }

    /// Computes the 2D cross product (a scalar).
    #[inline]
    pub fn cross(self, other: Self) -> F {
        self.x * other.y - self.y * other.x
    }

    /// Computes the squared length of the vector from the origin.
    #[inline]
    pub fn square_length(self) -> F {
        self.x * self.x + self.y * self.y
    }

    /// Computes the length of the vector from the origin.
    #[inline]
    pub fn length(self) -> F {
        self.square_length().sqrt()
    }

    /// Computes the Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> F {
        (other - self).length()
    }
}

impl<F: Float> Add for Point2<F> {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl<F: Float> Sub for Point2<F> {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl<F: Float> Neg for Point2<F> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl<F: Float> Mul<F> for Point2<F> {
    type Output = Self;

    #[inline]
    fn mul(self, s: F) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl<F: Float> Div<F> for Point2<F> {
    type Output = Self;

    #[inline]
    fn div(self, s: F) -> Self {
        Self::new(self.x / s, self.y / s)
    }
}

impl<F: Float> Default for Point2<F> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<F: Float> Index<usize> for Point2<F> {
    type Output = F;

    fn index(&self, index: usize) -> &F {
        match index {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("coordinate index {index} out of range for Point2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let p: Point2<f64> = Point2::new(1.0, 2.0);
        assert_eq!(p.x, 1.0);
        assert_eq!(p.y, 2.0);
    }

    #[test]
    fn test_dot_and_cross() {
        let a: Point2<f64> = Point2::new(1.0, 2.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.dot(b), 11.0);
        assert_eq!(a.cross(b), -2.0);
    }

    #[test]
    fn test_length() {
        let p: Point2<f64> = Point2::new(3.0, 4.0);
        assert_eq!(p.square_length(), 25.0);
        assert_eq!(p.length(), 5.0);
    }

    #[test]
    fn test_arithmetic() {
        let a: Point2<f64> = Point2::new(1.0, 2.0);
        let b = Point2::new(3.0, 5.0);
        let sum = a + b;
        assert_eq!(sum.x, 4.0);
        assert_eq!(sum.y, 7.0);

        let diff = b - a;
        assert_eq!(diff.x, 2.0);
        assert_eq!(diff.y, 3.0);

        let scaled = a * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);

        let halved = b / 2.0;
        assert_eq!(halved.x, 1.5);
        assert_eq!(halved.y, 2.5);

        let negated = -a;
        assert_eq!(negated.x, -1.0);
        assert_eq!(negated.y, -2.0);
    }

    #[test]
    fn test_distance() {
        let a: Point2<f64> = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_index() {
        let p: Point2<f64> = Point2::new(7.0, -2.0);
        assert_eq!(p[0], 7.0);
        assert_eq!(p[1], -2.0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_out_of_range() {
        let p: Point2<f64> = Point2::new(0.0, 0.0);
        let _ = p[2];
    }
}
