//! Circular arcs recovered from bulge-encoded polyline segments.

use std::f64::consts::PI;

use crate::error::SplineError;
use crate::precision::{almost_zero, compute_angle};
use crate::primitives::Point2;

/// A circular arc from `start_angle` to `end_angle` around `center`.
///
/// The sweep `end_angle - start_angle` is signed: positive for a
/// counterclockwise arc. `start_angle` lies in `[0, 2*pi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc2 {
    /// Center of the arc's circle.
    pub center: Point2<f64>,
    /// Radius of the arc's circle.
    pub radius: f64,
    /// Angle of the start point, measured from the positive x axis.
    pub start_angle: f64,
    /// `start_angle` plus the signed central angle.
    pub end_angle: f64,
}

impl Arc2 {
    /// Recovers the arc between two points from its bulge.
    ///
    /// The bulge is `tan(central_angle / 4)`, positive for counterclockwise
    /// arcs. A zero bulge or a zero-length chord has no arc and raises
    /// [`SplineError::IllegalArcBulge`].
    pub fn from_bulge(
        start: Point2<f64>,
        end: Point2<f64>,
        bulge: f64,
    ) -> Result<Self, SplineError> {
        let chord = end - start;
        let chord_length = chord.length();
        if almost_zero(bulge) || almost_zero(chord_length) {
            return Err(SplineError::IllegalArcBulge { bulge });
        }

        let central = 4.0 * bulge.atan();
        let half = 0.5 * chord_length;

        // the center sits on the chord bisector, on the left for a
        // counterclockwise arc shorter than a half turn
        let normal = Point2::new(-chord.y, chord.x) / chord_length;
        let center = (start + end) * 0.5 + normal * (half / (0.5 * central).tan());
        let radius = half / (0.5 * central.abs()).sin();

        let to_start = start - center;
        let start_angle = compute_angle(to_start.x, to_start.y);

        Ok(Self {
            center,
            radius,
            start_angle,
            end_angle: start_angle + central,
        })
    }

    /// Signed central angle of the arc.
    #[inline]
    pub fn central_angle(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Point on the circle at the given angle.
    pub fn point_at_angle(&self, angle: f64) -> Point2<f64> {
        self.center + Point2::new(angle.cos(), angle.sin()) * self.radius
    }

    /// Start point of the arc.
    pub fn start_point(&self) -> Point2<f64> {
        self.point_at_angle(self.start_angle)
    }

    /// End point of the arc.
    pub fn end_point(&self) -> Point2<f64> {
        self.point_at_angle(self.end_angle)
    }

    /// Arc length.
    pub fn length(&self) -> f64 {
        self.radius * self.central_angle().abs()
    }
}

/// Bulge of an arc with the given signed central angle.
#[inline]
pub fn bulge_from_central_angle(central: f64) -> f64 {
    debug_assert!(central.abs() < 2.0 * PI);
    (0.25 * central).tan()
}
