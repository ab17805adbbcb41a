//! Discretization of NURBS and Bezier curves into points, sample nodes,
//! or a 2D polyline.
//!
//! For point and node output the curve is first normalized by the refiner
//! (empty divide set), which splits it at every interior knot of raised
//! multiplicity so each piece is maximally smooth. Each piece is then
//! sampled under the deflection bound and the pieces are joined, dropping
//! the duplicated boundary samples. Polyline output instead converts the
//! curve to Bezier segments and fits each with biarcs.

use crate::curves::biarc::bezier_to_polyline;
use crate::curves::convert::nurbs_to_bezier;
use crate::curves::deflect::deflect_curve;
use crate::curves::nurbs::{BezierCurve, NurbsCurve, ScatterNode};
use crate::curves::refine::divide_nurbs;
use crate::error::SplineError;
use crate::polyline::Polyline2;
use crate::precision::{almost_zero, REAL_TOLERANCE};
use crate::primitives::{CurvePoint, Homogeneous, Point2};

/// Samples a NURBS curve into points within `deflection`.
///
/// Consecutive collinear points are merged, so the result can be sparser
/// than the raw sample sequence. Works for any degree >= 1.
pub fn scatter_nurbs_points<P: Homogeneous>(
    curve: &NurbsCurve<P>,
    deflection: f64,
) -> Result<Vec<P>, SplineError> {
    let nodes = scatter_segments(curve, deflection, false)?;
    let points: Vec<P> = nodes.into_iter().map(|node| node.point).collect();
    Ok(combine_collinear_points(&points))
}

/// Samples a NURBS curve into nodes carrying first and second derivatives.
///
/// Requires `degree >= 2`; no merging is applied so every node keeps its
/// exact parameter.
pub fn scatter_nurbs_nodes<P: Homogeneous>(
    curve: &NurbsCurve<P>,
    deflection: f64,
) -> Result<Vec<ScatterNode<P>>, SplineError> {
    if curve.degree < 2 {
        return Err(SplineError::WrongDegree {
            degree: curve.degree,
        });
    }

    scatter_segments(curve, deflection, true)
}

/// Approximates a 2D NURBS curve with a polyline of lines and arcs.
///
/// The curve is converted to Bezier segments and each segment is fitted
/// with biarcs; every point of the curve lies within `deflection` of the
/// result.
pub fn scatter_nurbs_polyline(
    curve: &NurbsCurve<Point2<f64>>,
    deflection: f64,
) -> Result<Polyline2, SplineError> {
    if deflection <= 0.0 {
        return Err(SplineError::WrongDeflection { deflection });
    }

    let mut polyline = Polyline2::new();
    for bezier in nurbs_to_bezier(curve)? {
        polyline.extend_from(&bezier_to_polyline(&bezier, deflection)?);
    }

    Ok(polyline)
}

/// Samples a Bezier segment into points within `deflection`.
pub fn scatter_bezier_points<P: Homogeneous>(
    bezier: &BezierCurve<P>,
    deflection: f64,
) -> Result<Vec<P>, SplineError> {
    scatter_nurbs_points(&bezier.to_nurbs()?, deflection)
}

/// Samples a Bezier segment into nodes with derivatives.
pub fn scatter_bezier_nodes<P: Homogeneous>(
    bezier: &BezierCurve<P>,
    deflection: f64,
) -> Result<Vec<ScatterNode<P>>, SplineError> {
    scatter_nurbs_nodes(&bezier.to_nurbs()?, deflection)
}

/// Approximates a 2D Bezier segment with a polyline of lines and arcs.
pub fn scatter_bezier_polyline(
    bezier: &BezierCurve<Point2<f64>>,
    deflection: f64,
) -> Result<Polyline2, SplineError> {
    bezier_to_polyline(bezier, deflection)
}

/// Normalizes the curve and samples every smooth piece, dropping the
/// sample duplicated at each internal boundary.
fn scatter_segments<P: Homogeneous>(
    curve: &NurbsCurve<P>,
    deflection: f64,
    with_deriv2: bool,
) -> Result<Vec<ScatterNode<P>>, SplineError> {
    if deflection <= 0.0 {
        return Err(SplineError::WrongDeflection { deflection });
    }

    let segments = divide_nurbs(curve, &[])?;

    let mut nodes: Vec<ScatterNode<P>> = Vec::new();
    for segment in &segments {
        let segment_nodes = deflect_curve(segment, deflection, with_deriv2)?;
        if !nodes.is_empty() {
            nodes.pop();
        }
        nodes.extend(segment_nodes);
    }

    Ok(nodes)
}

/// Drops points that lie on the straight line through their neighbors.
///
/// The test compares `|AB| + |BC|` against `|AC|`; equality within the
/// tolerance means `B` adds nothing and the previous point is replaced.
pub(crate) fn combine_collinear_points<P: CurvePoint>(points: &[P]) -> Vec<P> {
    let mut merged: Vec<P> = Vec::with_capacity(points.len());
    for &point in points {
        if merged.len() < 2 {
            // wait for the first segment of nonzero length
            if let Some(&last) = merged.last() {
                if (point - last).length() <= REAL_TOLERANCE {
                    continue;
                }
            }

            merged.push(point);
            continue;
        }

        let a = merged[merged.len() - 2];
        let b = merged[merged.len() - 1];
        let bc = (point - b).length();
        if bc <= REAL_TOLERANCE {
            continue;
        }

        let ab = (b - a).length();
        let ac = (point - a).length();
        if almost_zero(ab + bc - ac) {
            let last = merged.len() - 1;
            merged[last] = point;
        } else {
            merged.push(point);
        }
    }

    merged
}
