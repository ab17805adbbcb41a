//! NURBS and Bezier curve containers.
//!
//! A [`NurbsCurve`] stores poles, optional weights, a clamped knot vector
//! and a degree. An empty weight vector means the curve is non-rational.
//!
//! # Example
//!
//! ```
//! use polyarc::{Point2, curves::NurbsCurve};
//!
//! // A quadratic Bezier segment expressed as a NURBS curve
//! let curve = NurbsCurve::non_rational(
//!     vec![
//!         Point2::new(0.0, 0.0),
//!         Point2::new(1.0, 1.0),
//!         Point2::new(2.0, 0.0),
//!     ],
//!     2,
//!     vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
//! )
//! .unwrap();
//! assert!(!curve.is_rational().unwrap());
//! ```

use crate::error::SplineError;
use crate::precision::almost_equal;
use crate::primitives::CurvePoint;

/// A NURBS curve of arbitrary degree.
///
/// The knot vector must be clamped: the first and last knot each repeated
/// `degree + 1` times.
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsCurve<P> {
    /// Control points.
    pub poles: Vec<P>,
    /// Weights per pole; empty for a non-rational curve.
    pub weights: Vec<f64>,
    /// Clamped, non-decreasing knot vector.
    pub knots: Vec<f64>,
    /// Degree of the curve.
    pub degree: usize,
}

impl<P: CurvePoint> NurbsCurve<P> {
    /// Creates a curve and validates its data.
    pub fn new(
        poles: Vec<P>,
        weights: Vec<f64>,
        degree: usize,
        knots: Vec<f64>,
    ) -> Result<Self, SplineError> {
        let curve = Self {
            poles,
            weights,
            knots,
            degree,
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Creates a non-rational curve (a plain B-spline).
    pub fn non_rational(poles: Vec<P>, degree: usize, knots: Vec<f64>) -> Result<Self, SplineError> {
        Self::new(poles, Vec::new(), degree, knots)
    }

    /// Index of the first domain knot.
    #[inline]
    pub fn start_index(&self) -> usize {
        self.degree
    }

    /// Index of the last domain knot.
    #[inline]
    pub fn end_index(&self) -> usize {
        self.knots.len() - self.degree - 1
    }

    /// First parameter of the curve domain.
    #[inline]
    pub fn start_knot(&self) -> f64 {
        self.knots[self.start_index()]
    }

    /// Last parameter of the curve domain.
    #[inline]
    pub fn end_knot(&self) -> f64 {
        self.knots[self.end_index()]
    }

    /// Checks the structural invariants of the curve.
    pub fn validate(&self) -> Result<(), SplineError> {
        if self.degree < 1 {
            return Err(SplineError::NurbsParams("degree must be at least 1"));
        }

        if self.poles.len() < self.degree + 1 {
            return Err(SplineError::NurbsParams("not enough poles for the degree"));
        }

        if self.knots.len() != self.poles.len() + self.degree + 1 {
            return Err(SplineError::NurbsParams(
                "knot count must equal pole count plus degree plus one",
            ));
        }

        if !self.weights.is_empty() && self.weights.len() != self.poles.len() {
            return Err(SplineError::NurbsParams(
                "weight count must equal pole count",
            ));
        }

        for window in self.knots.windows(2) {
            if window[1] < window[0] {
                return Err(SplineError::NurbsParams("knots must be non-decreasing"));
            }
        }

        // clamped form: boundary knots repeated degree + 1 times
        if !almost_equal(self.knots[0], self.start_knot())
            || !almost_equal(self.knots[self.knots.len() - 1], self.end_knot())
        {
            return Err(SplineError::NurbsParams("knot vector must be clamped"));
        }

        if almost_equal(self.start_knot(), self.end_knot()) {
            return Err(SplineError::NurbsParams("curve domain is empty"));
        }

        Ok(())
    }

    /// Reports whether the curve is effectively rational.
    ///
    /// A curve whose weights are all equal behaves like a non-rational one
    /// and is treated as such.
    pub fn is_rational(&self) -> Result<bool, SplineError> {
        self.validate()?;
        if self.weights.is_empty() {
            return Ok(false);
        }

        let first = self.weights[0];
        Ok(self.weights.iter().any(|&w| !almost_equal(w, first)))
    }
}

/// A Bezier segment: a NURBS curve with a single span.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve<P> {
    /// Control points; the degree is `poles.len() - 1`.
    pub poles: Vec<P>,
    /// Weights per pole; empty for a non-rational segment.
    pub weights: Vec<f64>,
    /// Parameter at the start of the segment.
    pub start_knot: f64,
    /// Parameter at the end of the segment.
    pub end_knot: f64,
}

impl<P: CurvePoint> BezierCurve<P> {
    /// Creates a Bezier segment over the parameter range `[0, 1]`.
    pub fn new(poles: Vec<P>, weights: Vec<f64>) -> Self {
        Self {
            poles,
            weights,
            start_knot: 0.0,
            end_knot: 1.0,
        }
    }

    /// Degree of the segment.
    #[inline]
    pub fn degree(&self) -> usize {
        self.poles.len().saturating_sub(1)
    }

    /// Expresses the segment as a [`NurbsCurve`] with clamped knots.
    pub fn to_nurbs(&self) -> Result<NurbsCurve<P>, SplineError> {
        if self.poles.len() < 2 {
            return Err(SplineError::BezierParams("at least two poles required"));
        }

        if !self.weights.is_empty() && self.weights.len() != self.poles.len() {
            return Err(SplineError::BezierParams(
                "weight count must equal pole count",
            ));
        }

        if self.end_knot <= self.start_knot {
            return Err(SplineError::BezierParams(
                "end knot must be greater than start knot",
            ));
        }

        let degree = self.degree();
        let mut knots = Vec::with_capacity(2 * (degree + 1));
        knots.extend(std::iter::repeat(self.start_knot).take(degree + 1));
        knots.extend(std::iter::repeat(self.end_knot).take(degree + 1));

        NurbsCurve::new(self.poles.clone(), self.weights.clone(), degree, knots)
    }
}

/// A sample of a curve: point, first and second derivative at a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScatterNode<P> {
    /// Parameter of the sample.
    pub knot: f64,
    /// Point on the curve.
    pub point: P,
    /// First derivative with respect to the parameter.
    pub deriv1: P,
    /// Second derivative with respect to the parameter.
    pub deriv2: P,
}

/// Finds the knot span containing `knot`, with a cached starting guess.
///
/// The span index `i` satisfies `knots[i] <= knot < knots[i + 1]`. For the
/// last domain knot the search backs up past the trailing repeated run so
/// that the returned span is never empty.
pub(crate) fn find_span(
    knots: &[f64],
    knot: f64,
    start_index: usize,
    end_index: usize,
    cache_index: &mut usize,
) -> Result<usize, SplineError> {
    if knot < knots[start_index] || knot > knots[end_index] {
        return Err(SplineError::NurbsParams("knot outside the curve domain"));
    }

    // matched in cache
    let cached = *cache_index;
    if cached + 1 < knots.len() && knot >= knots[cached] && knot < knots[cached + 1] {
        return Ok(cached);
    }

    // the last knot
    if almost_equal(knot, knots[end_index]) {
        let mut knot_index = end_index - 1;
        while almost_equal(knots[knot_index], knots[end_index]) {
            knot_index -= 1;
        }

        *cache_index = knot_index;
        return Ok(knot_index);
    }

    // search by dichotomy
    let mut low = start_index;
    let mut high = end_index;
    let mut mid = (low & high) + ((low ^ high) >> 1);
    loop {
        if knot < knots[mid] {
            high = mid;
        } else if knot >= knots[mid + 1] {
            low = mid;
        } else {
            break;
        }

        mid = (low & high) + ((low ^ high) >> 1);
    }

    *cache_index = mid;
    Ok(mid)
}
