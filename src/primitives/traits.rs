//! Traits that let the curve algorithms run in 1D, 2D, and 3D.

use super::{Point2, Point3, Point4};
use crate::error::SplineError;
use crate::precision::almost_zero;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A point usable as a NURBS pole.
///
/// Covers the vector-space operations the De Boor recursion and the fitting
/// solvers need. Implemented for `f64` (speed profiles and other scalar
/// curves), [`Point2<f64>`] and [`Point3<f64>`], plus the homogeneous lifts.
pub trait CurvePoint:
    Copy
    + Debug
    + PartialEq
    + Default
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    /// The additive identity.
    fn zero() -> Self;

    /// Dot product with another point.
    fn dot(self, other: Self) -> f64;

    /// Squared Euclidean norm.
    #[inline]
    fn square_length(self) -> f64 {
        self.dot(self)
    }

    /// Euclidean norm.
    #[inline]
    fn length(self) -> f64 {
        self.square_length().sqrt()
    }
}

impl CurvePoint for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn dot(self, other: Self) -> f64 {
        self * other
    }
}

impl CurvePoint for Point2<f64> {
    #[inline]
    fn zero() -> Self {
        Self::origin()
    }

    #[inline]
    fn dot(self, other: Self) -> f64 {
        Point2::dot(self, other)
    }
}

impl CurvePoint for Point3<f64> {
    #[inline]
    fn zero() -> Self {
        Self::origin()
    }

    #[inline]
    fn dot(self, other: Self) -> f64 {
        Point3::dot(self, other)
    }
}

impl CurvePoint for Point4<f64> {
    #[inline]
    fn zero() -> Self {
        Self::origin()
    }

    #[inline]
    fn dot(self, other: Self) -> f64 {
        Point4::dot(self, other)
    }
}

/// Pairs a point type with its homogeneous lift, one dimension up.
///
/// Rational refinement runs the plain B-spline recursion on lifted poles
/// `(w * p, w)` and projects the result back afterwards.
pub trait Homogeneous: CurvePoint {
    /// The lifted point type, carrying the weight as its last coordinate.
    type Lifted: CurvePoint;

    /// Lifts `self` with the given weight into `(self * weight, weight)`.
    fn lift(self, weight: f64) -> Self::Lifted;

    /// Splits a lifted point into its weighted part and its weight.
    fn unlift(lifted: Self::Lifted) -> (Self, f64);

    /// Projects a lifted point back, dividing out the weight.
    ///
    /// Fails with [`SplineError::DivisorEqualZero`] when the weight has
    /// collapsed to zero.
    #[inline]
    fn project(lifted: Self::Lifted) -> Result<(Self, f64), SplineError> {
        let (weighted, weight) = Self::unlift(lifted);
        if almost_zero(weight) {
            return Err(SplineError::DivisorEqualZero);
        }

        Ok((weighted / weight, weight))
    }
}

impl Homogeneous for f64 {
    type Lifted = Point2<f64>;

    #[inline]
    fn lift(self, weight: f64) -> Point2<f64> {
        Point2::new(self * weight, weight)
    }

    #[inline]
    fn unlift(lifted: Point2<f64>) -> (Self, f64) {
        (lifted.x, lifted.y)
    }
}

impl Homogeneous for Point2<f64> {
    type Lifted = Point3<f64>;

    #[inline]
    fn lift(self, weight: f64) -> Point3<f64> {
        Point3::new(self.x * weight, self.y * weight, weight)
    }

    #[inline]
    fn unlift(lifted: Point3<f64>) -> (Self, f64) {
        (Point2::new(lifted.x, lifted.y), lifted.z)
    }
}

impl Homogeneous for Point3<f64> {
    type Lifted = Point4<f64>;

    #[inline]
    fn lift(self, weight: f64) -> Point4<f64> {
        Point4::new(self.x * weight, self.y * weight, self.z * weight, weight)
    }

    #[inline]
    fn unlift(lifted: Point4<f64>) -> (Self, f64) {
        (Point3::new(lifted.x, lifted.y, lifted.z), lifted.w)
    }
}
