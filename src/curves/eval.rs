//! NURBS curve evaluation.
//!
//! The evaluator runs the De Boor recursion over the valid pole window of
//! the current knot span. Three schemes cover the combinations of
//! rationality and derivative order:
//!
//! * non-rational curves use the plain recursion, truncated early to read
//!   off derivatives;
//! * rational points and first derivatives use the projective recursion
//!   that re-normalizes weights at every stage;
//! * rational second derivatives run the recursion on homogeneous lifted
//!   poles and apply the quotient rule afterwards.
//!
//! The pole window is cached per span, so sweeping a parameter along the
//! curve only refetches poles when the span changes.

use crate::curves::nurbs::{find_span, NurbsCurve, ScatterNode};
use crate::error::SplineError;
use crate::precision::{almost_equal, almost_zero};
use crate::primitives::{CurvePoint, Homogeneous};

/// Evaluates points and derivatives of a borrowed [`NurbsCurve`].
#[derive(Debug)]
pub struct NurbsEvaluator<'a, P: Homogeneous> {
    curve: &'a NurbsCurve<P>,
    rational: bool,
    start_index: usize,
    end_index: usize,
    span: usize,
    window_span: usize,
    valid_poles: Vec<P>,
    valid_weights: Vec<f64>,
    valid_lifted: Vec<P::Lifted>,
    temp_poles: Vec<P>,
    temp_weights: Vec<f64>,
    temp_lifted: Vec<P::Lifted>,
}

impl<'a, P: Homogeneous> NurbsEvaluator<'a, P> {
    /// Creates an evaluator, validating the curve up front.
    pub fn new(curve: &'a NurbsCurve<P>) -> Result<Self, SplineError> {
        let rational = curve.is_rational()?;

        let start_index = curve.start_index();
        let end_index = curve.end_index();

        let mut span = start_index;
        while almost_equal(curve.knots[span + 1], curve.knots[start_index]) {
            span += 1;
        }

        let mut evaluator = Self {
            curve,
            rational,
            start_index,
            end_index,
            span,
            window_span: span,
            valid_poles: Vec::with_capacity(curve.degree + 1),
            valid_weights: Vec::with_capacity(curve.degree + 1),
            valid_lifted: Vec::with_capacity(curve.degree + 1),
            temp_poles: Vec::with_capacity(curve.degree + 1),
            temp_weights: Vec::with_capacity(curve.degree + 1),
            temp_lifted: Vec::with_capacity(curve.degree + 1),
        };
        evaluator.record_valid_poles(span);
        Ok(evaluator)
    }

    /// Returns `true` when the curve has effective weights.
    #[inline]
    pub fn is_rational(&self) -> bool {
        self.rational
    }

    /// Point on the curve at `knot`.
    pub fn point_at(&mut self, knot: f64) -> Result<P, SplineError> {
        let span = self.prepare(knot)?;
        let degree = self.curve.degree;

        if self.rational {
            self.load_projective();
            self.projective_stages(knot, span, 0, degree)?;
            Ok(self.temp_poles[degree])
        } else {
            self.load_poles();
            de_boor_stages(
                &mut self.temp_poles,
                &self.curve.knots,
                degree,
                span,
                knot,
                0,
                degree,
            );
            Ok(self.temp_poles[degree])
        }
    }

    /// Point and first derivative at `knot`.
    pub fn derivs_at(&mut self, knot: f64) -> Result<(P, P), SplineError> {
        let span = self.prepare(knot)?;
        let degree = self.curve.degree;
        let knots = &self.curve.knots;
        let alpha = 1.0 / (knots[span + 1] - knots[span]);

        if self.rational {
            self.load_projective();
            self.projective_stages(knot, span, 0, degree - 1)?;

            let beta = (knot - self.curve.knots[span]) * alpha;
            let weight = (1.0 - beta) * self.temp_weights[degree - 1] + beta * self.temp_weights[degree];
            if almost_zero(weight * weight) {
                return Err(SplineError::DivisorEqualZero);
            }

            let deriv1 = (self.temp_poles[degree] - self.temp_poles[degree - 1])
                * (degree as f64)
                * alpha
                * (self.temp_weights[degree] * self.temp_weights[degree - 1] / (weight * weight));

            self.projective_stages(knot, span, degree - 1, degree)?;
            Ok((self.temp_poles[degree], deriv1))
        } else {
            self.load_poles();
            de_boor_stages(
                &mut self.temp_poles,
                &self.curve.knots,
                degree,
                span,
                knot,
                0,
                degree - 1,
            );

            let deriv1 =
                (self.temp_poles[degree] - self.temp_poles[degree - 1]) * (degree as f64) * alpha;

            de_boor_stages(
                &mut self.temp_poles,
                &self.curve.knots,
                degree,
                span,
                knot,
                degree - 1,
                degree,
            );
            Ok((self.temp_poles[degree], deriv1))
        }
    }

    /// Point plus first and second derivative at `knot`.
    ///
    /// Requires `degree >= 2`; lower degrees have no second derivative
    /// worth reporting and fail with [`SplineError::WrongDegree`].
    pub fn scatter_node_at(&mut self, knot: f64) -> Result<ScatterNode<P>, SplineError> {
        let degree = self.curve.degree;
        if degree < 2 {
            return Err(SplineError::WrongDegree { degree });
        }

        let span = self.prepare(knot)?;
        let knots = &self.curve.knots;

        let alpha1 = degree as f64 / (knots[span + 1] - knots[span]);
        let alpha2 = 1.0 / (knots[span + 2] - knots[span]);
        let alpha3 = 1.0 / (knots[span + 1] - knots[span - 1]);

        if self.rational {
            self.load_lifted();

            de_boor_stages(
                &mut self.temp_lifted,
                &self.curve.knots,
                degree,
                span,
                knot,
                0,
                degree - 2,
            );
            let lifted2 = ((self.temp_lifted[degree] - self.temp_lifted[degree - 1]) * alpha2
                - (self.temp_lifted[degree - 1] - self.temp_lifted[degree - 2]) * alpha3)
                * (alpha1 * (degree - 1) as f64);

            de_boor_stages(
                &mut self.temp_lifted,
                &self.curve.knots,
                degree,
                span,
                knot,
                degree - 2,
                degree - 1,
            );
            let lifted1 = (self.temp_lifted[degree] - self.temp_lifted[degree - 1]) * alpha1;

            de_boor_stages(
                &mut self.temp_lifted,
                &self.curve.knots,
                degree,
                span,
                knot,
                degree - 1,
                degree,
            );
            let lifted0 = self.temp_lifted[degree];

            let (numerator0, denominator0) = P::unlift(lifted0);
            let (numerator1, denominator1) = P::unlift(lifted1);
            let (numerator2, denominator2) = P::unlift(lifted2);
            if almost_zero(denominator0) {
                return Err(SplineError::DivisorEqualZero);
            }

            let inv = 1.0 / denominator0;
            let point = numerator0 * inv;
            let deriv1 = (numerator1 * denominator0 - numerator0 * denominator1) * (inv * inv);
            let deriv2 = (numerator2 * denominator0
                - deriv1 * (2.0 * denominator0 * denominator1)
                - numerator0 * denominator2)
                * (inv * inv);

            Ok(ScatterNode {
                knot,
                point,
                deriv1,
                deriv2,
            })
        } else {
            self.load_poles();

            de_boor_stages(
                &mut self.temp_poles,
                &self.curve.knots,
                degree,
                span,
                knot,
                0,
                degree - 2,
            );
            let deriv2 = ((self.temp_poles[degree] - self.temp_poles[degree - 1]) * alpha2
                - (self.temp_poles[degree - 1] - self.temp_poles[degree - 2]) * alpha3)
                * (alpha1 * (degree - 1) as f64);

            de_boor_stages(
                &mut self.temp_poles,
                &self.curve.knots,
                degree,
                span,
                knot,
                degree - 2,
                degree - 1,
            );
            let deriv1 = (self.temp_poles[degree] - self.temp_poles[degree - 1]) * alpha1;

            de_boor_stages(
                &mut self.temp_poles,
                &self.curve.knots,
                degree,
                span,
                knot,
                degree - 1,
                degree,
            );

            Ok(ScatterNode {
                knot,
                point: self.temp_poles[degree],
                deriv1,
                deriv2,
            })
        }
    }

    /// Locates the span for `knot` and refreshes the pole window if needed.
    fn prepare(&mut self, knot: f64) -> Result<usize, SplineError> {
        let span = find_span(
            &self.curve.knots,
            knot,
            self.start_index,
            self.end_index,
            &mut self.span,
        )?;
        if span != self.window_span || self.valid_poles.is_empty() {
            self.record_valid_poles(span);
        }

        Ok(span)
    }

    fn record_valid_poles(&mut self, span: usize) {
        let degree = self.curve.degree;
        let window = (span - degree)..=span;

        self.valid_poles.clear();
        self.valid_poles.extend_from_slice(&self.curve.poles[window.clone()]);

        self.valid_weights.clear();
        self.valid_lifted.clear();
        if self.rational {
            self.valid_weights
                .extend_from_slice(&self.curve.weights[window.clone()]);
            for index in window {
                self.valid_lifted
                    .push(self.curve.poles[index].lift(self.curve.weights[index]));
            }
        }

        self.window_span = span;
    }

    fn load_poles(&mut self) {
        self.temp_poles.clear();
        self.temp_poles.extend_from_slice(&self.valid_poles);
    }

    fn load_projective(&mut self) {
        self.load_poles();
        self.temp_weights.clear();
        self.temp_weights.extend_from_slice(&self.valid_weights);
    }

    fn load_lifted(&mut self) {
        self.temp_lifted.clear();
        self.temp_lifted.extend_from_slice(&self.valid_lifted);
    }

    /// Projective De Boor stages: poles and weights advance together, with
    /// the pole blend weighted by the old and new stage weights.
    fn projective_stages(
        &mut self,
        knot: f64,
        span: usize,
        from_stage: usize,
        to_stage: usize,
    ) -> Result<(), SplineError> {
        let degree = self.curve.degree;
        let knots = &self.curve.knots;

        for stage in from_stage..to_stage {
            for index in ((stage + 1)..=degree).rev() {
                let knot_index = span - degree + index;
                let alpha = (knot - knots[knot_index])
                    / (knots[span + index - stage] - knots[knot_index]);

                let old_low = self.temp_weights[index - 1];
                let old_high = self.temp_weights[index];
                let new_weight = (1.0 - alpha) * old_low + alpha * old_high;
                if almost_zero(new_weight) {
                    return Err(SplineError::DivisorEqualZero);
                }

                self.temp_poles[index] = self.temp_poles[index - 1]
                    * ((1.0 - alpha) * old_low / new_weight)
                    + self.temp_poles[index] * (alpha * old_high / new_weight);
                self.temp_weights[index] = new_weight;
            }
        }

        Ok(())
    }
}

/// Plain De Boor stages run in place over the pole window.
///
/// Stage `i` blends neighbours `index - 1` and `index` for every window
/// index above `i`, descending so that each read still sees the previous
/// stage's value.
fn de_boor_stages<Q: CurvePoint>(
    temp: &mut [Q],
    knots: &[f64],
    degree: usize,
    span: usize,
    knot: f64,
    from_stage: usize,
    to_stage: usize,
) {
    for stage in from_stage..to_stage {
        for index in ((stage + 1)..=degree).rev() {
            let knot_index = span - degree + index;
            let alpha =
                (knot - knots[knot_index]) / (knots[span + index - stage] - knots[knot_index]);
            temp[index] = temp[index - 1] * (1.0 - alpha) + temp[index] * alpha;
        }
    }
}
