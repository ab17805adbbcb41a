//! Cubic NURBS interpolation through fit points.
//!
//! Builds a clamped degree-3 non-rational curve through `n` fit points
//! using `n + 2` poles. The parameterization is accumulated chord length
//! normalized to `[0, 1]` unless the caller supplies a knot vector. End
//! conditions come from prescribed tangents when set, otherwise from a
//! natural second-derivative row. The tridiagonal system is solved with
//! the Thomas algorithm.

use crate::curves::nurbs::NurbsCurve;
use crate::error::SplineError;
use crate::precision::{almost_zero, REAL_TOLERANCE};
use crate::primitives::CurvePoint;

const DEGREE: usize = 3;

/// Interpolates fit points with a clamped cubic NURBS curve.
///
/// Tangents and knots are optional; set them before calling
/// [`interpolate`](Self::interpolate).
#[derive(Debug, Clone, Default)]
pub struct CubicInterpolator<P> {
    start_tangent: Option<P>,
    end_tangent: Option<P>,
    knots: Option<Vec<f64>>,
}

impl<P: CurvePoint> CubicInterpolator<P> {
    pub fn new() -> Self {
        Self {
            start_tangent: None,
            end_tangent: None,
            knots: None,
        }
    }

    /// Prescribes the curve derivative at the first fit point.
    pub fn set_start_tangent(&mut self, tangent: P) -> &mut Self {
        self.start_tangent = Some(tangent);
        self
    }

    /// Prescribes the curve derivative at the last fit point.
    pub fn set_end_tangent(&mut self, tangent: P) -> &mut Self {
        self.end_tangent = Some(tangent);
        self
    }

    /// Supplies the knot vector instead of chord-length parameterization.
    ///
    /// For `n` fit points the vector must hold `n + 6` knots in clamped
    /// cubic form.
    pub fn set_knots(&mut self, knots: Vec<f64>) -> &mut Self {
        self.knots = Some(knots);
        self
    }

    /// Computes the interpolating curve.
    pub fn interpolate(&self, points: &[P]) -> Result<NurbsCurve<P>, SplineError> {
        let fit_count = points.len();
        if fit_count < 2 {
            return Err(SplineError::NurbsParams("at least two fit points required"));
        }

        let knots = match &self.knots {
            Some(knots) => {
                if knots.len() != fit_count + DEGREE + 3 {
                    return Err(SplineError::NurbsParams(
                        "knot count must equal fit point count plus six",
                    ));
                }
                knots.clone()
            }
            None => chord_length_knots(points)?,
        };

        let poles = self.solve_poles(points, &knots)?;
        NurbsCurve::non_rational(poles, DEGREE, knots)
    }

    /// Assembles and solves the tridiagonal system for the interior poles.
    fn solve_poles(&self, points: &[P], knots: &[f64]) -> Result<Vec<P>, SplineError> {
        let fit_count = points.len();
        let size = fit_count;
        let mut lower = vec![0.0; size];
        let mut diagonal = vec![0.0; size];
        let mut upper = vec![0.0; size];
        let mut rhs = vec![P::zero(); size];

        // interior rows: the basis functions of the three poles active at
        // each internal knot
        for i in (DEGREE + 1)..(knots.len() - DEGREE - 1) {
            let row = i - DEGREE;
            let d10 = knots[i + 1] - knots[i];
            let d01 = knots[i] - knots[i - 1];
            let d11 = knots[i + 1] - knots[i - 1];
            let d12 = knots[i + 1] - knots[i - 2];
            let d02 = knots[i] - knots[i - 2];
            let d20 = knots[i + 2] - knots[i];
            let d21 = knots[i + 2] - knots[i - 1];

            lower[row] = d10 * d10 / (d11 * d12);
            diagonal[row] = d10 * d02 / (d11 * d12) + d01 * d20 / (d11 * d21);
            upper[row] = d01 * d01 / (d11 * d21);
            rhs[row] = points[row];
        }

        // start condition
        let d_start = knots[DEGREE + 1] - knots[DEGREE];
        match self.start_tangent {
            Some(tangent) => {
                diagonal[0] = 3.0 / d_start;
                rhs[0] = tangent + points[0] * diagonal[0];
            }
            None => {
                let d_start2 = knots[DEGREE + 2] - knots[DEGREE];
                diagonal[0] = 6.0 / (d_start * d_start) + 6.0 / (d_start * d_start2);
                upper[0] = -6.0 / (d_start * d_start2);
                rhs[0] = points[0] * (6.0 / (d_start * d_start));
            }
        }

        // end condition
        let last = knots.len() - DEGREE - 1;
        let d_end = knots[last] - knots[last - 1];
        match self.end_tangent {
            Some(tangent) => {
                diagonal[size - 1] = 3.0 / d_end;
                rhs[size - 1] = points[fit_count - 1] * diagonal[size - 1] - tangent;
            }
            None => {
                let d_end2 = knots[last] - knots[last - 2];
                lower[size - 1] = -6.0 / (d_end * d_end2);
                diagonal[size - 1] = 6.0 / (d_end * d_end2) + 6.0 / (d_end * d_end);
                rhs[size - 1] = points[fit_count - 1] * (6.0 / (d_end * d_end));
            }
        }

        let interior = solve_tridiagonal(&lower, &diagonal, &upper, &rhs)?;

        let mut poles = Vec::with_capacity(fit_count + 2);
        poles.push(points[0]);
        poles.extend(interior);
        poles.push(points[fit_count - 1]);
        Ok(poles)
    }
}

/// Clamped cubic knot vector from normalized accumulated chord lengths.
fn chord_length_knots<P: CurvePoint>(points: &[P]) -> Result<Vec<f64>, SplineError> {
    let mut chords = Vec::with_capacity(points.len());
    chords.push(0.0);
    for pair in points.windows(2) {
        let previous = chords[chords.len() - 1];
        chords.push(previous + (pair[1] - pair[0]).length());
    }

    let total = chords[chords.len() - 1];
    if total <= REAL_TOLERANCE {
        return Err(SplineError::NurbsParams("fit points are coincident"));
    }

    let mut knots = Vec::with_capacity(points.len() + DEGREE + 3);
    knots.extend(std::iter::repeat(0.0).take(DEGREE));
    knots.extend(chords.iter().map(|&chord| chord / total));
    knots.extend(std::iter::repeat(1.0).take(DEGREE));
    Ok(knots)
}

/// Thomas algorithm: LU factorization without pivoting.
fn solve_tridiagonal<P: CurvePoint>(
    lower: &[f64],
    diagonal: &[f64],
    upper: &[f64],
    rhs: &[P],
) -> Result<Vec<P>, SplineError> {
    let size = diagonal.len();

    let mut factor_lower = vec![0.0; size];
    let mut factor_diag = vec![0.0; size];
    factor_diag[0] = diagonal[0];
    if almost_zero(factor_diag[0]) {
        return Err(SplineError::SingularSystem);
    }

    for i in 1..size {
        factor_lower[i] = lower[i] / factor_diag[i - 1];
        factor_diag[i] = diagonal[i] - factor_lower[i] * upper[i - 1];
        if almost_zero(factor_diag[i]) {
            return Err(SplineError::SingularSystem);
        }
    }

    // forward substitution
    let mut forward = vec![P::zero(); size];
    forward[0] = rhs[0];
    for i in 1..size {
        forward[i] = rhs[i] - forward[i - 1] * factor_lower[i];
    }

    // back substitution
    let mut solution = vec![P::zero(); size];
    solution[size - 1] = forward[size - 1] / factor_diag[size - 1];
    for i in (0..size - 1).rev() {
        solution[i] = (forward[i] - solution[i + 1] * upper[i]) / factor_diag[i];
    }

    Ok(solution)
}
