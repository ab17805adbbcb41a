//! Biarc approximation of a 2D Bezier curve by a line/arc polyline.
//!
//! The curve is scattered at half the target deflection, split hard at
//! knots where the turning direction reverses, and each interval is fitted
//! with a pair of tangent-continuous circular arcs. Intervals whose fit
//! error exceeds the deflection are split at the sample of maximum error
//! and retried, through an explicit worklist that preserves knot order.

use std::collections::VecDeque;
use std::f64::consts::PI;

use crate::curves::nurbs::{BezierCurve, ScatterNode};
use crate::curves::scatter::scatter_bezier_nodes;
use crate::error::SplineError;
use crate::polyline::{Polyline2, PolylineNode};
use crate::precision::{almost_equal, almost_zero, compute_angle, sign, REAL_TOLERANCE};
use crate::primitives::Point2;

/// Approximates a Bezier curve with a polyline of lines and arcs.
///
/// Every point of the curve lies within `deflection` of the returned
/// polyline. Consecutive pieces share endpoints and, away from forced
/// splits, tangent directions.
pub fn bezier_to_polyline(
    bezier: &BezierCurve<Point2<f64>>,
    deflection: f64,
) -> Result<Polyline2, SplineError> {
    if deflection <= 0.0 {
        return Err(SplineError::WrongDeflection { deflection });
    }

    if bezier.poles.len() < 2 {
        return Err(SplineError::BezierParams("at least two poles required"));
    }

    let mut polyline = Polyline2::new();

    // a degree-1 segment is already a line
    if bezier.degree() == 1 {
        polyline.push(bezier.poles[0], PolylineNode::new(bezier.poles[1], 0.0));
        return Ok(polyline);
    }

    // sample finely so the fit error check sees enough of the curve
    let nodes = scatter_bezier_nodes(bezier, deflection * 0.5)?;
    if nodes.len() < 3 {
        let first = nodes[0].point;
        let last = nodes[nodes.len() - 1].point;
        polyline.push(first, PolylineNode::new(last, 0.0));
        return Ok(polyline);
    }

    // interval boundaries: curve ends plus every turning reversal
    let mut boundaries = vec![nodes[0].knot];
    boundaries.extend(search_reverse_knots(&nodes));
    boundaries.push(nodes[nodes.len() - 1].knot);

    let mut intervals: VecDeque<(f64, f64)> = boundaries
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    while let Some(&(start_knot, end_knot)) = intervals.front() {
        let start_index = find_node_index(&nodes, start_knot)?;
        let end_index = find_node_index(&nodes, end_knot)?;

        match fit_interval(&nodes, start_index, end_index, deflection)? {
            FitOutcome::Accepted(pieces) => {
                for piece in &pieces {
                    if (piece.end - piece.start).length() <= REAL_TOLERANCE {
                        continue;
                    }

                    polyline.push(piece.start, PolylineNode::new(piece.end, piece.bulge()));
                }

                intervals.pop_front();
            }
            FitOutcome::Split(divide_knot) => {
                // front-loaded so the split halves keep knot order
                intervals.pop_front();
                intervals.push_front((divide_knot, end_knot));
                intervals.push_front((start_knot, divide_knot));
            }
        }
    }

    Ok(polyline)
}

enum FitOutcome {
    Accepted(Vec<BiarcPiece>),
    Split(f64),
}

/// One half of a biarc: a line (infinite radius) or a circular arc with a
/// signed central angle.
#[derive(Debug, Clone, Copy)]
struct BiarcPiece {
    start: Point2<f64>,
    end: Point2<f64>,
    center: Point2<f64>,
    radius: f64,
    central: f64,
}

impl BiarcPiece {
    fn line(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self {
            start,
            end,
            center: Point2::origin(),
            radius: f64::INFINITY,
            central: 0.0,
        }
    }

    fn is_line(&self) -> bool {
        !self.radius.is_finite()
    }

    fn bulge(&self) -> f64 {
        if self.is_line() {
            0.0
        } else {
            (0.25 * self.central).tan()
        }
    }

    fn point_vector(&self, point: Point2<f64>) -> Point2<f64> {
        point - self.center
    }
}

/// Knots where the turning direction of the tangent flips twice in a row.
///
/// A single flip can be bridged by a biarc, but a double flip marks an
/// S-shaped stretch that must be split before fitting.
fn search_reverse_knots(nodes: &[ScatterNode<Point2<f64>>]) -> Vec<f64> {
    let mut reverse_knots = Vec::new();
    if nodes.len() < 3 {
        return reverse_knots;
    }

    let mut last_sign = 0.0;
    let mut flips = 0;

    // the pair ending at the last sample never forces a split
    for i in 1..nodes.len() - 1 {
        let turn = sign(nodes[i - 1].deriv1.cross(nodes[i].deriv1));
        if turn == 0.0 {
            continue;
        }

        if last_sign != 0.0 && turn != last_sign {
            flips += 1;
            if flips == 2 {
                reverse_knots.push(nodes[i - 1].knot);
                flips = 0;
            }
        }

        last_sign = turn;
    }

    reverse_knots
}

/// Locates the sample whose knot matches `knot`.
fn find_node_index(
    nodes: &[ScatterNode<Point2<f64>>],
    knot: f64,
) -> Result<usize, SplineError> {
    let mut low = 0;
    let mut high = nodes.len() - 1;
    while low <= high {
        let mid = (low + high) / 2;
        if almost_equal(nodes[mid].knot, knot) {
            return Ok(mid);
        }

        if nodes[mid].knot < knot {
            low = mid + 1;
        } else {
            if mid == 0 {
                break;
            }
            high = mid - 1;
        }
    }

    Err(SplineError::BezierParams("knot is not a sample boundary"))
}

/// Fits a biarc over one interval and verifies it against the interior
/// samples.
fn fit_interval(
    nodes: &[ScatterNode<Point2<f64>>],
    start_index: usize,
    end_index: usize,
    deflection: f64,
) -> Result<FitOutcome, SplineError> {
    let start = nodes[start_index];
    let end = nodes[end_index];
    let pieces = biarc_fit(start.point, start.deriv1, end.point, end.deriv1)?;

    // the degenerate single-piece fit has nothing left to verify
    if pieces.len() != 2 {
        return Ok(FitOutcome::Accepted(pieces));
    }

    let mut max_error = 0.0;
    let mut divide_knot = f64::NAN;
    for node in &nodes[start_index + 1..end_index] {
        let error = piece_distance(node.point, &pieces[0])
            .min(piece_distance(node.point, &pieces[1]));
        if error > max_error {
            max_error = error;
            divide_knot = node.knot;
        }
    }

    if max_error <= deflection + REAL_TOLERANCE {
        Ok(FitOutcome::Accepted(pieces))
    } else {
        Ok(FitOutcome::Split(divide_knot))
    }
}

/// Constructs the two arcs joining `start` to `end` with the prescribed
/// tangents, balancing the offset distance `d` between both ends.
fn biarc_fit(
    start: Point2<f64>,
    start_tangent: Point2<f64>,
    end: Point2<f64>,
    end_tangent: Point2<f64>,
) -> Result<Vec<BiarcPiece>, SplineError> {
    let norm1 = start_tangent.length();
    let norm2 = end_tangent.length();
    if almost_zero(norm1) || almost_zero(norm2) {
        return Err(SplineError::BiarcFitParams("zero-length tangent"));
    }

    let t1 = start_tangent / norm1;
    let t2 = end_tangent / norm2;
    let chord = end - start;
    let chord2 = chord.square_length();

    // coincident endpoints: nothing to fit
    if almost_zero(chord2) {
        return Ok(vec![BiarcPiece::line(start, end)]);
    }

    let denom = 2.0 * (1.0 - t1.dot(t2));
    let offset;
    if almost_zero(denom) {
        // identical tangent directions
        let denom2 = 4.0 * chord.dot(t2);
        if almost_zero(denom2) {
            // and perpendicular to the chord: two semicircles
            let connect = (start + end) * 0.5;
            let direction = sign(chord.cross(t2));
            let radius = 0.25 * chord.length();
            return Ok(vec![
                BiarcPiece {
                    start,
                    end: connect,
                    center: (start + connect) * 0.5,
                    radius,
                    central: -direction * PI,
                },
                BiarcPiece {
                    start: connect,
                    end,
                    center: (connect + end) * 0.5,
                    radius,
                    central: direction * PI,
                },
            ]);
        }

        offset = chord2 / denom2;
    } else {
        let mixed = chord.dot(t1 + t2);
        let discriminant = mixed * mixed + denom * chord2;
        offset = (-mixed + discriminant.abs().sqrt()) / denom;
    }

    let connect = (start + end + (t1 - t2) * offset) * 0.5;

    let first = compute_arc(start, t1, connect);
    let mut first_piece = BiarcPiece {
        start,
        end: connect,
        center: first.center,
        radius: first.radius,
        central: first.central,
    };
    if !first.radius.is_finite() {
        first_piece = BiarcPiece::line(start, connect);
    }

    // the second arc is built backwards from the end, so its sweep flips
    let second = compute_arc(end, -t2, connect);
    let mut second_piece = BiarcPiece {
        start: connect,
        end,
        center: second.center,
        radius: second.radius,
        central: -second.central,
    };
    if !second.radius.is_finite() {
        second_piece = BiarcPiece::line(connect, end);
    }

    Ok(vec![first_piece, second_piece])
}

struct ArcGeometry {
    center: Point2<f64>,
    radius: f64,
    central: f64,
}

/// Arc through `start` and `end` tangent to the unit vector `tangent` at
/// `start`. An infinite radius marks a straight segment.
fn compute_arc(start: Point2<f64>, tangent: Point2<f64>, end: Point2<f64>) -> ArcGeometry {
    let chord = end - start;
    let perpendicular = Point2::new(-tangent.y, tangent.x);

    let denominator = 2.0 * chord.dot(perpendicular);
    if almost_zero(denominator) {
        return ArcGeometry {
            center: Point2::origin(),
            radius: f64::INFINITY,
            central: 0.0,
        };
    }

    let signed_radius = chord.square_length() / denominator;
    let center = start + perpendicular * signed_radius;
    let radius = signed_radius.abs();

    let to_start = start - center;
    let to_end = end - center;
    let cos_angle = (to_start.dot(to_end) / (radius * radius)).clamp(-1.0, 1.0);
    let mut central = cos_angle.acos();
    if chord.dot(tangent) < 0.0 {
        central = 2.0 * PI - central;
    }
    central *= sign(to_start.cross(tangent));

    ArcGeometry {
        center,
        radius,
        central,
    }
}

/// Distance from a point to one biarc piece, falling back to the nearer
/// endpoint when the perpendicular foot lies outside the piece.
fn piece_distance(point: Point2<f64>, piece: &BiarcPiece) -> f64 {
    let distance = if piece.is_line() {
        dist_point_to_segment(point, piece.start, piece.end)
    } else {
        dist_point_to_arc(point, piece)
    };

    if distance.is_nan() {
        (point - piece.start)
            .length()
            .min((point - piece.end).length())
    } else {
        distance
    }
}

/// NaN when the perpendicular foot falls outside the segment.
fn dist_point_to_segment(point: Point2<f64>, start: Point2<f64>, end: Point2<f64>) -> f64 {
    let axis = end - start;
    let length = axis.length();
    if almost_zero(length) {
        return f64::NAN;
    }

    if (point - start).dot(axis) < 0.0 || (point - end).dot(start - end) < 0.0 {
        return f64::NAN;
    }

    axis.cross(point - start).abs() / length
}

/// NaN when the point's angle falls outside the arc's sector.
fn dist_point_to_arc(point: Point2<f64>, piece: &BiarcPiece) -> f64 {
    let to_start = piece.start - piece.center;
    let to_point = piece.point_vector(point);
    let radius2 = piece.radius * piece.radius;

    let rotate_angle = compute_angle(
        to_start.dot(to_point) / radius2,
        sign(piece.central) * to_start.cross(to_point) / radius2,
    );

    if piece.central.abs() > rotate_angle {
        (to_point.length() - piece.radius).abs()
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::arc::Arc2;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn quarter_circle_bezier(r: f64) -> BezierCurve<Point2<f64>> {
        BezierCurve::new(
            vec![
                Point2::new(r, 0.0),
                Point2::new(r, r),
                Point2::new(0.0, r),
            ],
            vec![1.0, FRAC_1_SQRT_2, 1.0],
        )
    }

    /// Distance from a point to the nearest piece of the polyline.
    fn polyline_distance(polyline: &Polyline2, point: Point2<f64>) -> f64 {
        let mut best = f64::INFINITY;
        for (i, node) in polyline.nodes.iter().enumerate() {
            let start = polyline.segment_start(i);
            let distance = if node.is_line() {
                let from_segment = dist_point_to_segment(point, start, node.end);
                if from_segment.is_nan() {
                    (point - start).length().min((point - node.end).length())
                } else {
                    from_segment
                }
            } else {
                let arc = Arc2::from_bulge(start, node.end, node.bulge).unwrap();
                ((point - arc.center).length() - arc.radius).abs()
            };

            best = best.min(distance);
        }

        best
    }

    #[test]
    fn test_line_bezier_passthrough() {
        let bezier = BezierCurve::new(
            vec![Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)],
            Vec::new(),
        );
        let polyline = bezier_to_polyline(&bezier, 0.1).unwrap();
        assert_eq!(polyline.len(), 1);
        assert!(polyline.nodes[0].is_line());
        assert_eq!(polyline.nodes[0].end, Point2::new(3.0, 4.0));
    }

    #[test]
    fn test_straight_quadratic_gives_lines() {
        let bezier = BezierCurve::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 2.0),
            ],
            Vec::new(),
        );
        let polyline = bezier_to_polyline(&bezier, 0.01).unwrap();
        assert!(polyline.nodes.iter().all(PolylineNode::is_line));
        assert_eq!(polyline.start, Point2::new(0.0, 0.0));
        assert_eq!(polyline.nodes[polyline.len() - 1].end, Point2::new(2.0, 2.0));
    }

    #[test]
    fn test_quarter_circle_fits_exact_arcs() {
        let r = 10.0;
        let polyline = bezier_to_polyline(&quarter_circle_bezier(r), 0.01).unwrap();

        assert!(!polyline.is_empty());
        assert_abs_diff_eq!(polyline.start.x, r, epsilon = 1e-9);
        let last = polyline.nodes[polyline.len() - 1].end;
        assert_abs_diff_eq!(last.y, r, epsilon = 1e-9);

        // the biarc of circle samples with exact tangents is the circle
        for (i, node) in polyline.nodes.iter().enumerate() {
            assert!(!node.is_line());
            let arc = Arc2::from_bulge(polyline.segment_start(i), node.end, node.bulge).unwrap();
            assert_abs_diff_eq!(arc.center.x, 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(arc.center.y, 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(arc.radius, r, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_s_curve_stays_within_deflection() {
        // cubic with an inflection point
        let bezier = BezierCurve::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 6.0),
                Point2::new(8.0, -6.0),
                Point2::new(12.0, 0.0),
            ],
            Vec::new(),
        );

        let deflection = 0.05;
        let polyline = bezier_to_polyline(&bezier, deflection).unwrap();
        assert!(polyline.len() >= 2);

        // pieces are connected in order
        for i in 1..polyline.len() {
            assert_eq!(polyline.segment_start(i), polyline.nodes[i - 1].end);
        }

        // dense re-sampling stays within the deflection bound
        let samples = scatter_bezier_nodes(&bezier, deflection * 0.1).unwrap();
        for sample in &samples {
            assert!(polyline_distance(&polyline, sample.point) <= deflection + 1e-6);
        }
    }

    #[test]
    fn test_semicircle_special_case() {
        // parallel tangents perpendicular to the chord
        let pieces = biarc_fit(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 1.0),
        )
        .unwrap();

        assert_eq!(pieces.len(), 2);
        assert_abs_diff_eq!(pieces[0].radius, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(pieces[0].central, -PI, epsilon = 1e-9);
        assert_abs_diff_eq!(pieces[1].central, PI, epsilon = 1e-9);
        assert_eq!(pieces[0].end, Point2::new(1.0, 0.0));
    }

    fn turning_node(knot: f64, deriv1: Point2<f64>) -> ScatterNode<Point2<f64>> {
        ScatterNode {
            knot,
            point: Point2::new(knot, 0.0),
            deriv1,
            deriv2: Point2::origin(),
        }
    }

    #[test]
    fn test_reverse_knot_between_interior_samples() {
        let nodes = [
            turning_node(0.0, Point2::new(1.0, 0.0)),
            turning_node(0.25, Point2::new(1.0, 1.0)),
            turning_node(0.5, Point2::new(1.0, 0.0)),
            turning_node(0.75, Point2::new(1.0, 1.0)),
            turning_node(1.0, Point2::new(1.0, 2.0)),
        ];

        // the second flip happens on the pair ending at knot 0.75
        assert_eq!(search_reverse_knots(&nodes), vec![0.5]);
    }

    #[test]
    fn test_reverse_at_last_sample_is_ignored() {
        // same turning pattern, but the second flip lands on the pair
        // ending at the final sample and must not force a split
        let nodes = [
            turning_node(0.0, Point2::new(1.0, 0.0)),
            turning_node(0.25, Point2::new(1.0, 1.0)),
            turning_node(0.5, Point2::new(1.0, 0.0)),
            turning_node(1.0, Point2::new(1.0, 1.0)),
        ];

        assert!(search_reverse_knots(&nodes).is_empty());
        assert!(search_reverse_knots(&nodes[..2]).is_empty());
    }

    #[test]
    fn test_zero_tangent_is_rejected() {
        assert!(matches!(
            biarc_fit(
                Point2::new(0.0, 0.0),
                Point2::origin(),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 0.0),
            ),
            Err(SplineError::BiarcFitParams(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_deflection() {
        assert!(matches!(
            bezier_to_polyline(&quarter_circle_bezier(1.0), 0.0),
            Err(SplineError::WrongDeflection { .. })
        ));
    }
}
