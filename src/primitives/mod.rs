//! Geometric primitives shared by the curve algorithms.

mod point2;
mod point3;
mod point4;
mod traits;

pub use point2::Point2;
pub use point3::Point3;
pub use point4::Point4;
pub use traits::{CurvePoint, Homogeneous};
