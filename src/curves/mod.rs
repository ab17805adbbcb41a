//! NURBS and Bezier curve algorithms: evaluation, refinement, conversion,
//! discretization, biarc fitting and interpolation.

mod arc;
mod biarc;
mod convert;
mod deflect;
mod eval;
mod interp;
mod nurbs;
mod refine;
mod scatter;

pub use arc::{bulge_from_central_angle, Arc2};
pub use biarc::bezier_to_polyline;
pub use convert::nurbs_to_bezier;
pub use eval::NurbsEvaluator;
pub use interp::CubicInterpolator;
pub use nurbs::{BezierCurve, NurbsCurve, ScatterNode};
pub use refine::divide_nurbs;
pub use scatter::{
    scatter_bezier_nodes, scatter_bezier_points, scatter_bezier_polyline, scatter_nurbs_nodes,
    scatter_nurbs_points, scatter_nurbs_polyline,
};
