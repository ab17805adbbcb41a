//! Polyline with bulge-encoded arc segments.
//!
//! Each node stores the segment end point and a bulge factor. A bulge of
//! zero marks a straight segment; otherwise the bulge is the tangent of a
//! quarter of the arc's central angle, positive for counterclockwise arcs.

use crate::precision::almost_zero;
use crate::primitives::Point2;

/// One polyline segment: the end point plus the bulge of the piece leading
/// to it from the previous point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolylineNode {
    /// End point of the segment.
    pub end: Point2<f64>,
    /// `tan(central_angle / 4)`, signed by direction; `0.0` for a line.
    pub bulge: f64,
}

impl PolylineNode {
    /// Creates a new node.
    #[inline]
    pub fn new(end: Point2<f64>, bulge: f64) -> Self {
        Self { end, bulge }
    }

    /// Returns `true` when the segment is a straight line.
    #[inline]
    pub fn is_line(&self) -> bool {
        almost_zero(self.bulge)
    }
}

/// A 2D polyline made of line and arc segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline2 {
    /// Start point of the first segment.
    pub start: Point2<f64>,
    /// The segments, in order.
    pub nodes: Vec<PolylineNode>,
}

impl Polyline2 {
    /// Creates an empty polyline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when the polyline has no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a segment, fixing the start point if this is the first one.
    pub fn push(&mut self, start: Point2<f64>, node: PolylineNode) {
        if self.nodes.is_empty() {
            self.start = start;
        }

        self.nodes.push(node);
    }

    /// Appends every segment of `other`, keeping the existing start point
    /// unless the polyline was empty.
    pub fn extend_from(&mut self, other: &Polyline2) {
        if self.nodes.is_empty() {
            self.start = other.start;
        }

        self.nodes.extend_from_slice(&other.nodes);
    }

    /// Start point of segment `index`.
    pub fn segment_start(&self, index: usize) -> Point2<f64> {
        if index == 0 {
            self.start
        } else {
            self.nodes[index - 1].end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_sets_start_once() {
        let mut polyline = Polyline2::new();
        polyline.push(
            Point2::new(1.0, 1.0),
            PolylineNode::new(Point2::new(2.0, 2.0), 0.0),
        );
        polyline.push(
            Point2::new(9.0, 9.0),
            PolylineNode::new(Point2::new(3.0, 1.0), 0.5),
        );

        assert_eq!(polyline.start, Point2::new(1.0, 1.0));
        assert_eq!(polyline.len(), 2);
        assert_eq!(polyline.segment_start(1), Point2::new(2.0, 2.0));
        assert!(polyline.nodes[0].is_line());
        assert!(!polyline.nodes[1].is_line());
    }

    #[test]
    fn test_extend_from() {
        let mut a = Polyline2::new();
        let mut b = Polyline2::new();
        b.push(
            Point2::new(0.0, 0.0),
            PolylineNode::new(Point2::new(1.0, 0.0), 0.0),
        );

        a.extend_from(&b);
        assert_eq!(a.start, Point2::new(0.0, 0.0));
        assert_eq!(a.len(), 1);
    }
}
