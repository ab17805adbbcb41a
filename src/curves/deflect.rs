//! Quasi-uniform sampling of a NURBS curve under a deflection bound.
//!
//! Each knot span is pre-split into a minimum number of subintervals, then
//! every subinterval is refined with a flatness test until the estimated
//! sagitta stays below the requested deflection. The flatness estimate
//! compares the normalized tangents at both ends of a candidate chord and
//! falls back to a midpoint distance check when the chord or a tangent
//! degenerates, or when the end tangents coincide and the comparison is
//! blind to the bulge between them.

use std::collections::VecDeque;

use crate::curves::eval::NurbsEvaluator;
use crate::curves::nurbs::{NurbsCurve, ScatterNode};
use crate::error::SplineError;
use crate::precision::{almost_equal, SQUARE_REAL_TOLERANCE};
use crate::primitives::Homogeneous;

/// Samples `curve` so that consecutive nodes deviate from the curve by no
/// more than `deflection`.
///
/// With `with_deriv2` set, every node also carries the second derivative,
/// which requires `degree >= 2`. Without it the second derivative of the
/// returned nodes is zero.
pub(crate) fn deflect_curve<P: Homogeneous>(
    curve: &NurbsCurve<P>,
    deflection: f64,
    with_deriv2: bool,
) -> Result<Vec<ScatterNode<P>>, SplineError> {
    if deflection <= 0.0 {
        return Err(SplineError::WrongDeflection { deflection });
    }

    if with_deriv2 && curve.degree < 2 {
        return Err(SplineError::WrongDegree {
            degree: curve.degree,
        });
    }

    let mut eval = NurbsEvaluator::new(curve)?;

    // distinct knots inside the domain
    let mut valid_knots = vec![curve.start_knot()];
    for &knot in &curve.knots[curve.start_index() + 1..=curve.end_index()] {
        if !almost_equal(knot, valid_knots[valid_knots.len() - 1]) {
            valid_knots.push(knot);
        }
    }

    // minimum subintervals per span, rounded up to even
    let mut inner_count = curve.degree.saturating_sub(1).max(2);
    if inner_count % 2 == 1 {
        inner_count += 1;
    }

    let mut sampler = Sampler {
        eval: &mut eval,
        with_deriv2,
        deflection2: deflection * deflection,
    };

    let mut nodes = vec![sampler.node_at(valid_knots[0])?];

    for span in valid_knots.windows(2) {
        let step = (span[1] - span[0]) / inner_count as f64;

        let mut work: VecDeque<(ScatterNode<P>, usize)> = VecDeque::new();
        for i in 1..inner_count {
            work.push_back((sampler.node_at(span[0] + step * i as f64)?, 2));
        }
        work.push_back((sampler.node_at(span[1])?, 2));

        while let Some(&(end, point_min)) = work.front() {
            let start = nodes[nodes.len() - 1];

            let (candidate, reaches_end) = if point_min > 2 {
                let delta = (end.knot - start.knot) / (point_min - 1) as f64;
                (sampler.node_at(start.knot + delta)?, false)
            } else {
                (end, true)
            };

            if sampler.flatness2(&start, &candidate)? < sampler.deflection2 {
                nodes.push(candidate);
                if reaches_end {
                    work.pop_front();
                } else if let Some(front) = work.front_mut() {
                    front.1 = point_min - 1;
                }
            } else {
                work.push_front((candidate, 3));
            }
        }
    }

    Ok(nodes)
}

struct Sampler<'e, 'a, P: Homogeneous> {
    eval: &'e mut NurbsEvaluator<'a, P>,
    with_deriv2: bool,
    deflection2: f64,
}

impl<P: Homogeneous> Sampler<'_, '_, P> {
    fn node_at(&mut self, knot: f64) -> Result<ScatterNode<P>, SplineError> {
        if self.with_deriv2 {
            self.eval.scatter_node_at(knot)
        } else {
            let (point, deriv1) = self.eval.derivs_at(knot)?;
            Ok(ScatterNode {
                knot,
                point,
                deriv1,
                deriv2: P::zero(),
            })
        }
    }

    /// Squared sagitta estimate for the chord between two nodes.
    fn flatness2(
        &mut self,
        start: &ScatterNode<P>,
        end: &ScatterNode<P>,
    ) -> Result<f64, SplineError> {
        let chord2 = (end.point - start.point).square_length();
        if chord2 > SQUARE_REAL_TOLERANCE {
            let norm1 = start.deriv1.square_length();
            let norm2 = end.deriv1.square_length();
            if norm1 > SQUARE_REAL_TOLERANCE && norm2 > SQUARE_REAL_TOLERANCE {
                let turn = end.deriv1 / norm2.sqrt() - start.deriv1 / norm1.sqrt();
                // equal end tangents say nothing about the bulge in between
                let turn2 = turn.square_length();
                if turn2 > SQUARE_REAL_TOLERANCE {
                    return Ok(turn2 * chord2 / 64.0);
                }
            }
        }

        // degenerate chord, tangent, or coinciding tangents: check the
        // midpoint directly
        let mid_knot = 0.5 * (start.knot + end.knot);
        let mid_chord = (start.point + end.point) * 0.5;
        let on_curve = self.eval.point_at(mid_knot)?;
        Ok((mid_chord - on_curve).square_length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Point2;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn quarter_circle(r: f64) -> NurbsCurve<Point2<f64>> {
        NurbsCurve::new(
            vec![
                Point2::new(r, 0.0),
                Point2::new(r, r),
                Point2::new(0.0, r),
            ],
            vec![1.0, FRAC_1_SQRT_2, 1.0],
            2,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_non_positive_deflection() {
        let curve = quarter_circle(10.0);
        assert!(matches!(
            deflect_curve(&curve, 0.0, false),
            Err(SplineError::WrongDeflection { .. })
        ));
    }

    #[test]
    fn test_rejects_low_degree_with_deriv2() {
        let curve = NurbsCurve::non_rational(
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
            1,
            vec![0.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        assert!(matches!(
            deflect_curve(&curve, 0.1, true),
            Err(SplineError::WrongDegree { degree: 1 })
        ));
    }

    #[test]
    fn test_endpoints_are_exact() {
        let curve = quarter_circle(10.0);
        let nodes = deflect_curve(&curve, 0.05, true).unwrap();
        assert!(nodes.len() >= 3);
        assert_abs_diff_eq!(nodes[0].knot, 0.0);
        assert_abs_diff_eq!(nodes[nodes.len() - 1].knot, 1.0);
        assert_abs_diff_eq!(nodes[0].point.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(nodes[nodes.len() - 1].point.y, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_knots_increase_and_deviation_is_bounded() {
        let r = 10.0;
        let deflection = 0.02;
        let curve = quarter_circle(r);
        let nodes = deflect_curve(&curve, deflection, false).unwrap();

        for pair in nodes.windows(2) {
            assert!(pair[1].knot > pair[0].knot);
            // exact sagitta of a circular arc chord
            let chord = (pair[1].point - pair[0].point).length();
            let sagitta = r - (r * r - 0.25 * chord * chord).sqrt();
            // the flatness test is an estimate; allow slack
            assert!(sagitta < 1.5 * deflection);
        }

        for node in &nodes {
            assert_abs_diff_eq!(node.point.length(), r, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_coinciding_tangents_still_refine() {
        // quartic with x(t) = t and y'(t) = 1000 t (t - 0.05)(t - 0.25):
        // the tangents at t = 0 and t = 0.25 are both (1, 0), so the
        // tangent comparison alone cannot see the bulge on [0, 0.25]
        let curve = NurbsCurve::non_rational(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.25, 0.0),
                Point2::new(0.5, 25.0 / 24.0),
                Point2::new(0.75, -21.875),
                Point2::new(1.0, 156.25),
            ],
            4,
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        )
        .unwrap();

        let deflection = 0.01;
        let nodes = deflect_curve(&curve, deflection, false).unwrap();

        // the chord [0, 0.25] bulges by about 0.05 and must be split
        assert!(nodes
            .iter()
            .any(|node| node.knot > 1e-9 && node.knot < 0.25 - 1e-9));

        // dense re-sampling of the flat-tangent stretch stays within the
        // bound (with estimate slack)
        let mut eval = NurbsEvaluator::new(&curve).unwrap();
        for pair in nodes.windows(2) {
            if pair[1].knot > 0.25 + 1e-9 {
                break;
            }

            let chord = pair[1].point - pair[0].point;
            let chord_length = chord.length();
            for step in 1..10 {
                let knot = pair[0].knot + (pair[1].knot - pair[0].knot) * (step as f64 / 10.0);
                let on_curve = eval.point_at(knot).unwrap();
                let deviation = chord.cross(on_curve - pair[0].point).abs() / chord_length;
                assert!(deviation <= 2.0 * deflection);
            }
        }
    }

    #[test]
    fn test_tighter_deflection_needs_more_nodes() {
        let curve = quarter_circle(10.0);
        let coarse = deflect_curve(&curve, 0.5, false).unwrap();
        let fine = deflect_curve(&curve, 0.005, false).unwrap();
        assert!(fine.len() > coarse.len());
    }
}
