//! Knot refinement and curve subdivision.
//!
//! [`divide_nurbs`] inserts knots until every requested divide parameter
//! (and every already-repeated interior knot) reaches full multiplicity
//! `degree + 1`, then slices the refined arrays into independent clamped
//! curves at those breakpoints.
//!
//! Rational curves are refined in homogeneous space: poles are lifted to
//! `(w * p, w)`, the plain insertion runs one dimension up, and the result
//! is projected back.

use crate::curves::nurbs::{find_span, NurbsCurve};
use crate::error::SplineError;
use crate::precision::{almost_equal, almost_zero};
use crate::primitives::{CurvePoint, Homogeneous};

/// Splits a curve at the given parameters.
///
/// `divide_knots` must be non-decreasing and inside the curve domain. An
/// empty slice still normalizes the curve: interior knots that already
/// carry multiplicity above one are completed to full multiplicity and the
/// curve is split there.
pub fn divide_nurbs<P: Homogeneous>(
    curve: &NurbsCurve<P>,
    divide_knots: &[f64],
) -> Result<Vec<NurbsCurve<P>>, SplineError> {
    let rational = curve.is_rational()?;
    let degree = curve.degree;
    let start_index = curve.start_index();
    let end_index = curve.end_index();

    let repeated = construct_repeated_knots(
        &curve.knots,
        degree,
        start_index,
        end_index,
        divide_knots,
    )?;

    if repeated.is_empty() {
        let weights = rational.then_some(curve.weights.as_slice());
        return subsections(degree, &curve.knots, &curve.poles, weights);
    }

    let mut span_hint = start_index;
    if rational {
        let lifted: Vec<P::Lifted> = curve
            .poles
            .iter()
            .zip(&curve.weights)
            .map(|(&pole, &weight)| pole.lift(weight))
            .collect();

        let (new_lifted, new_knots) = refine_with_knots(
            &lifted,
            &curve.knots,
            degree,
            &repeated,
            start_index,
            end_index,
            &mut span_hint,
        )?;

        let mut poles = Vec::with_capacity(new_lifted.len());
        let mut weights = Vec::with_capacity(new_lifted.len());
        for lifted_pole in new_lifted {
            let (pole, weight) = P::project(lifted_pole)?;
            poles.push(pole);
            weights.push(weight);
        }

        subsections(degree, &new_knots, &poles, Some(&weights))
    } else {
        let (poles, new_knots) = refine_with_knots(
            &curve.poles,
            &curve.knots,
            degree,
            &repeated,
            start_index,
            end_index,
            &mut span_hint,
        )?;

        subsections(degree, &new_knots, &poles, None)
    }
}

/// Builds the multiset of knots to insert so that boundary knots, divide
/// knots, and already-repeated interior knots all reach multiplicity
/// `degree + 1`.
fn construct_repeated_knots(
    knots: &[f64],
    degree: usize,
    start_index: usize,
    end_index: usize,
    divide_knots: &[f64],
) -> Result<Vec<f64>, SplineError> {
    for window in divide_knots.windows(2) {
        if window[1] < window[0] {
            return Err(SplineError::NurbsParams("divide knots must be sorted"));
        }
    }

    if let (Some(&first), Some(&last)) = (divide_knots.first(), divide_knots.last()) {
        if first < knots[start_index] || last > knots[end_index] {
            return Err(SplineError::NurbsParams(
                "divide knot outside the curve domain",
            ));
        }
    }

    // first index of the leading run and last index of the trailing run
    let mut lead_index = 0;
    while !almost_equal(knots[lead_index], knots[start_index]) {
        lead_index += 1;
    }

    let mut tail_index = knots.len() - 1;
    while !almost_equal(knots[tail_index], knots[end_index]) {
        tail_index -= 1;
    }

    let mut repeated = Vec::new();

    // start knot
    let mut lead_count = 1;
    for i in (lead_index + 1)..=tail_index {
        if !almost_equal(knots[i], knots[lead_index]) {
            break;
        }
        lead_count += 1;
    }
    repeated.extend(std::iter::repeat(knots[lead_index]).take((degree + 1).saturating_sub(lead_count)));

    let mut divide_index = 0;
    while divide_index < divide_knots.len()
        && almost_equal(divide_knots[divide_index], knots[lead_index])
    {
        divide_index += 1;
    }

    // inner knots
    let inner_start = lead_index + lead_count;
    let mut flag_knot = knots[inner_start];
    let mut repeat_count = 1;
    for i in (inner_start + 1)..=tail_index {
        if almost_equal(knots[i], flag_knot) {
            repeat_count += 1;
            continue;
        }

        let mut must_insert = false;
        while divide_index < divide_knots.len()
            && almost_equal(divide_knots[divide_index], flag_knot)
        {
            must_insert = true;
            divide_index += 1;
        }

        // divide knots that match no existing knot get full multiplicity
        while divide_index < divide_knots.len() && divide_knots[divide_index] < flag_knot {
            let aim_knot = divide_knots[divide_index];
            divide_index += 1;
            while divide_index < divide_knots.len()
                && almost_equal(divide_knots[divide_index], aim_knot)
            {
                divide_index += 1;
            }

            repeated.extend(std::iter::repeat(aim_knot).take(degree + 1));
        }

        if repeat_count > 1 || degree == 1 || must_insert {
            repeated.extend(
                std::iter::repeat(flag_knot).take((degree + 1).saturating_sub(repeat_count)),
            );
        }

        flag_knot = knots[i];
        repeat_count = 1;
    }

    // divide knots left in the last open interval, before the end knot
    while divide_index < divide_knots.len()
        && divide_knots[divide_index] < flag_knot
        && !almost_equal(divide_knots[divide_index], flag_knot)
    {
        let aim_knot = divide_knots[divide_index];
        divide_index += 1;
        while divide_index < divide_knots.len() && almost_equal(divide_knots[divide_index], aim_knot)
        {
            divide_index += 1;
        }

        repeated.extend(std::iter::repeat(aim_knot).take(degree + 1));
    }

    if repeat_count > 1 {
        repeated.extend(std::iter::repeat(flag_knot).take((degree + 1).saturating_sub(repeat_count)));
    }

    // end knot
    if repeated.is_empty() || !almost_equal(*repeated.last().unwrap_or(&f64::NAN), knots[tail_index]) {
        let mut tail_count = 1;
        let mut i = tail_index - 1;
        while i >= start_index && almost_equal(knots[i], knots[tail_index]) {
            tail_count += 1;
            if i == start_index {
                break;
            }
            i -= 1;
        }

        repeated.extend(
            std::iter::repeat(knots[tail_index]).take((degree + 1).saturating_sub(tail_count)),
        );
    }

    Ok(repeated)
}

/// Banded knot insertion over the affected span range.
///
/// Inserts the repeated knots back to front, reusing the already-shifted
/// tail of the new arrays, so each inserted knot costs one `degree`-wide
/// blend of poles.
fn refine_with_knots<Q: CurvePoint>(
    src_poles: &[Q],
    src_knots: &[f64],
    degree: usize,
    repeated: &[f64],
    start_index: usize,
    end_index: usize,
    span_hint: &mut usize,
) -> Result<(Vec<Q>, Vec<f64>), SplineError> {
    let repeat_size = repeated.len();
    debug_assert!(repeat_size > 0);

    let min_index = find_span(src_knots, repeated[0], start_index, end_index, span_hint)?;
    let max_index =
        find_span(src_knots, repeated[repeat_size - 1], start_index, end_index, span_hint)? + 1;

    // copy the constant knots
    let mut new_knots = vec![0.0; src_knots.len() + repeat_size];
    new_knots[..=min_index].copy_from_slice(&src_knots[..=min_index]);
    for i in max_index..src_knots.len() {
        new_knots[i + repeat_size] = src_knots[i];
    }

    // copy the constant poles
    let mut new_poles = vec![Q::zero(); src_poles.len() + repeat_size];
    new_poles[..=(min_index - degree)].copy_from_slice(&src_poles[..=(min_index - degree)]);
    for i in (max_index - 1)..src_poles.len() {
        new_poles[i + repeat_size] = src_poles[i];
    }

    // new knots and poles
    let mut index = max_index + degree;
    let mut flag = max_index + degree + repeat_size;
    for j in (0..repeat_size).rev() {
        while index > min_index && repeated[j] <= src_knots[index] {
            new_poles[flag - degree - 1] = src_poles[index - degree - 1];
            new_knots[flag] = src_knots[index];
            flag -= 1;
            index -= 1;
        }

        new_poles[flag - degree - 1] = new_poles[flag - degree];
        for k in 1..=degree {
            let temp = flag - degree + k;
            let mut alpha = new_knots[flag + k] - repeated[j];
            if almost_zero(alpha) {
                new_poles[temp - 1] = new_poles[temp];
            } else {
                alpha /= new_knots[flag + k] - src_knots[index - degree + k];
                new_poles[temp - 1] =
                    new_poles[temp - 1] * alpha + new_poles[temp] * (1.0 - alpha);
            }
        }

        new_knots[flag] = repeated[j];
        flag -= 1;
    }

    Ok((new_poles, new_knots))
}

/// Slices refined arrays into independent clamped curves at every knot of
/// multiplicity `degree + 1`.
fn subsections<P: CurvePoint>(
    degree: usize,
    knots: &[f64],
    poles: &[P],
    weights: Option<&[f64]>,
) -> Result<Vec<NurbsCurve<P>>, SplineError> {
    // first index of the leading run and last index of the trailing run
    let start_flag = degree;
    let mut start_index = 0;
    while !almost_equal(knots[start_index], knots[start_flag]) {
        start_index += 1;
    }

    let end_flag = knots.len() - degree - 1;
    let mut end_index = knots.len() - 1;
    while !almost_equal(knots[end_index], knots[end_flag]) {
        end_index -= 1;
    }

    let mut curves: Vec<NurbsCurve<P>> = Vec::new();
    let mut segment_knots: Vec<f64> = Vec::with_capacity(degree * 2 + 2);

    let mut pole_index = start_index;
    let mut repeat_count = 1;
    let mut flag_knot = knots[start_index];
    for i in (start_index + 1)..=end_index {
        // repeated knot
        if almost_equal(knots[i], flag_knot) {
            repeat_count += 1;
            continue;
        }

        // no repeat inner knot
        if repeat_count == 1 {
            segment_knots.push(flag_knot);
            flag_knot = knots[i];
            continue;
        }

        if repeat_count <= degree {
            return Err(SplineError::NurbsParams(
                "interior knot with partial multiplicity",
            ));
        }

        segment_knots.extend(std::iter::repeat(flag_knot).take(repeat_count));

        if segment_knots.len() <= degree * 2 {
            flag_knot = knots[i];
            repeat_count = 1;
            continue;
        }

        // close the segment
        let pole_count = segment_knots.len() - degree - 1;
        curves.push(make_segment(
            degree,
            &segment_knots,
            &poles[pole_index..pole_index + pole_count],
            weights.map(|w| &w[pole_index..pole_index + pole_count]),
        ));

        segment_knots.clear();
        segment_knots.extend(std::iter::repeat(flag_knot).take(repeat_count));

        pole_index += pole_count;
        flag_knot = knots[i];
        repeat_count = 1;
    }

    // last repeat knot
    if repeat_count <= degree {
        return Err(SplineError::NurbsParams(
            "trailing knot with partial multiplicity",
        ));
    }
    segment_knots.extend(std::iter::repeat(flag_knot).take(repeat_count));

    // last poles
    if pole_index >= poles.len() {
        return Err(SplineError::NurbsParams("pole bookkeeping out of range"));
    }
    let pole_count = segment_knots.len() - degree - 1;
    curves.push(make_segment(
        degree,
        &segment_knots,
        &poles[pole_index..pole_index + pole_count],
        weights.map(|w| &w[pole_index..pole_index + pole_count]),
    ));

    if pole_index + pole_count != poles.len() - (knots.len() - 1 - end_index) {
        return Err(SplineError::NurbsParams("pole bookkeeping out of range"));
    }

    Ok(curves)
}

fn make_segment<P: CurvePoint>(
    degree: usize,
    knots: &[f64],
    poles: &[P],
    weights: Option<&[f64]>,
) -> NurbsCurve<P> {
    NurbsCurve {
        poles: poles.to_vec(),
        weights: weights.map(<[f64]>::to_vec).unwrap_or_default(),
        knots: knots.to_vec(),
        degree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::eval::NurbsEvaluator;
    use crate::primitives::Point2;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn quadratic() -> NurbsCurve<Point2<f64>> {
        NurbsCurve::non_rational(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 0.0),
            ],
            2,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
        .unwrap()
    }

    fn quarter_circle() -> NurbsCurve<Point2<f64>> {
        NurbsCurve::new(
            vec![
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
            vec![1.0, FRAC_1_SQRT_2, 1.0],
            2,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
        .unwrap()
    }

    fn assert_same_point(a: Point2<f64>, b: Point2<f64>) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
    }

    #[test]
    fn test_divide_quadratic_at_half() {
        let curve = quadratic();
        let segments = divide_nurbs(&curve, &[0.5]).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].poles.len(), 3);
        assert_eq!(segments[1].poles.len(), 3);
        assert_abs_diff_eq!(segments[0].end_knot(), 0.5);
        assert_abs_diff_eq!(segments[1].start_knot(), 0.5);

        // segments reproduce the input curve
        let mut reference = NurbsEvaluator::new(&curve).unwrap();
        for segment in &segments {
            let mut refined = NurbsEvaluator::new(segment).unwrap();
            let (start, end) = (segment.start_knot(), segment.end_knot());
            for step in 0..=10 {
                let t = start + (end - start) * (step as f64 / 10.0);
                assert_same_point(
                    refined.point_at(t).unwrap(),
                    reference.point_at(t).unwrap(),
                );
            }
        }
    }

    #[test]
    fn test_divide_rational_in_homogeneous_space() {
        let curve = quarter_circle();
        let segments = divide_nurbs(&curve, &[0.5]).unwrap();
        assert_eq!(segments.len(), 2);

        // both halves still lie exactly on the circle
        for segment in &segments {
            assert!(segment.is_rational().unwrap());
            let mut eval = NurbsEvaluator::new(segment).unwrap();
            let (start, end) = (segment.start_knot(), segment.end_knot());
            for step in 0..=8 {
                let t = start + (end - start) * (step as f64 / 8.0);
                assert_abs_diff_eq!(eval.point_at(t).unwrap().length(), 10.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_empty_divide_splits_repeated_knots() {
        // double interior knots already present: the empty divide set still
        // separates the curve there
        let curve = NurbsCurve::new(
            vec![
                Point2::new(0.0, -1.0),
                Point2::new(3.0f64.sqrt(), -1.0),
                Point2::new(3.0f64.sqrt() / 2.0, 0.5),
                Point2::new(0.0, 2.0),
                Point2::new(-3.0f64.sqrt() / 2.0, 0.5),
                Point2::new(-3.0f64.sqrt(), -1.0),
                Point2::new(0.0, -1.0),
            ],
            vec![1.0, 0.5, 1.0, 0.5, 1.0, 0.5, 1.0],
            2,
            vec![
                0.0,
                0.0,
                0.0,
                1.0 / 3.0,
                1.0 / 3.0,
                2.0 / 3.0,
                2.0 / 3.0,
                1.0,
                1.0,
                1.0,
            ],
        )
        .unwrap();

        let segments = divide_nurbs(&curve, &[]).unwrap();
        assert_eq!(segments.len(), 3);
        let mut eval = NurbsEvaluator::new(&curve).unwrap();
        for segment in &segments {
            let mut refined = NurbsEvaluator::new(segment).unwrap();
            let mid = 0.5 * (segment.start_knot() + segment.end_knot());
            assert_same_point(refined.point_at(mid).unwrap(), eval.point_at(mid).unwrap());
        }
    }

    #[test]
    fn test_divide_rejects_unsorted_knots() {
        let curve = quadratic();
        assert!(matches!(
            divide_nurbs(&curve, &[0.7, 0.3]),
            Err(SplineError::NurbsParams(_))
        ));
    }

    #[test]
    fn test_divide_rejects_out_of_domain_knots() {
        let curve = quadratic();
        assert!(matches!(
            divide_nurbs(&curve, &[1.5]),
            Err(SplineError::NurbsParams(_))
        ));
    }
}
