//! 4D point type, used as the homogeneous lift of [`Point3`](super::Point3).

use num_traits::Float;
use std::ops::{Add, Div, Index, Mul, Neg, Sub};

/// A 4D point with x, y, z, and w coordinates.
///
/// Generic over floating-point types (`f32` or `f64`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point4<F> {
    pub x: F,
    pub y: F,
    pub z: F,
    pub w: F,
}

impl<F: Float> Point4<F> {
    /// Creates a new point.
    #[inline]
    pub fn new(x: F, y: F, z: F, w: F) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a point at the origin (0, 0, 0, 0).
    #[inline]
    pub fn origin() -> Self {
        Self {
            x: F::zero(),
            y: F::zero(),
            z: F::zero(),
            w: F::zero(),
        }
    }

    /// Computes the dot product with another point.
    #[inline]
    pub fn dot(self, other: Self) -> F {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Computes the squared length of the vector from the origin.
    #[inline]
    pub fn square_length(self) -> F {
        self.dot(self)
    }

    /// Computes the length of the vector from the origin.
    #[inline]
    pub fn length(self) -> F {
        self.square_length().sqrt()
    }
}

impl<F: Float> Add for Point4<F> {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl<F: Float> Sub for Point4<F> {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        )
    }
}

impl<F: Float> Neg for Point4<F> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl<F: Float> Mul<F> for Point4<F> {
    type Output = Self;

    #[inline]
    fn mul(self, s: F) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl<F: Float> Div<F> for Point4<F> {
    type Output = Self;

    #[inline]
    fn div(self, s: F) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s, self.w / s)
    }
}

impl<F: Float> Default for Point4<F> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<F: Float> Index<usize> for Point4<F> {
    type Output = F;

    fn index(&self, index: usize) -> &F {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("coordinate index {index} out of range for Point4"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a: Point4<f64> = Point4::new(1.0, 2.0, 3.0, 4.0);
        let b = Point4::new(4.0, 3.0, 2.0, 1.0);
        let sum = a + b;
        assert_eq!(sum, Point4::new(5.0, 5.0, 5.0, 5.0));

        let diff = a - b;
        assert_eq!(diff, Point4::new(-3.0, -1.0, 1.0, 3.0));

        let scaled = a * 2.0;
        assert_eq!(scaled, Point4::new(2.0, 4.0, 6.0, 8.0));

        let halved = a / 2.0;
        assert_eq!(halved, Point4::new(0.5, 1.0, 1.5, 2.0));
    }

    #[test]
    fn test_length() {
        let p: Point4<f64> = Point4::new(2.0, 2.0, 2.0, 2.0);
        assert_eq!(p.square_length(), 16.0);
        assert_eq!(p.length(), 4.0);
    }
}
