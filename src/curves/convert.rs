//! Conversion of a NURBS curve into Bezier segments.
//!
//! Every interior knot is raised to full multiplicity, which makes each
//! remaining span an independent Bezier segment.

use crate::curves::nurbs::{BezierCurve, NurbsCurve};
use crate::curves::refine::divide_nurbs;
use crate::error::SplineError;
use crate::primitives::Homogeneous;

/// Splits a NURBS curve into Bezier segments covering the same domain.
///
/// The segments keep the input parameterization: segment `i` spans the
/// interval between two consecutive distinct knots of the input curve.
pub fn nurbs_to_bezier<P: Homogeneous>(
    curve: &NurbsCurve<P>,
) -> Result<Vec<BezierCurve<P>>, SplineError> {
    curve.validate()?;

    let interior = &curve.knots[curve.start_index() + 1..curve.end_index()];
    let segments = divide_nurbs(curve, interior)?;

    let mut beziers = Vec::with_capacity(segments.len());
    for segment in segments {
        // after full subdivision every segment has a single span
        if segment.poles.len() != segment.degree + 1 {
            return Err(SplineError::BezierParams(
                "subdivision left a segment with more than one span",
            ));
        }

        beziers.push(BezierCurve {
            poles: segment.poles,
            weights: segment.weights,
            start_knot: segment.knots[segment.degree],
            end_knot: segment.knots[segment.degree + 1],
        });
    }

    Ok(beziers)
}
