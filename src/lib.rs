//! polyarc - NURBS curve evaluation and discretization
//!
//! A small geometry kernel for free-form curves: evaluate NURBS and Bezier
//! curves up to the second derivative, subdivide them by knot insertion,
//! discretize them into points or bulge-encoded line/arc polylines within a
//! deflection bound, and interpolate fit points with clamped cubics.

pub mod curves;
pub mod error;
pub mod polyline;
pub mod precision;
pub mod primitives;

pub use curves::{
    bezier_to_polyline, divide_nurbs, nurbs_to_bezier, scatter_bezier_nodes,
    scatter_bezier_points, scatter_bezier_polyline, scatter_nurbs_nodes, scatter_nurbs_points,
    scatter_nurbs_polyline, Arc2, BezierCurve, CubicInterpolator, NurbsCurve, NurbsEvaluator,
    ScatterNode,
};
pub use error::SplineError;
pub use polyline::{Polyline2, PolylineNode};
pub use primitives::{CurvePoint, Homogeneous, Point2, Point3, Point4};
