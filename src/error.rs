//! Error types for spline operations.

use thiserror::Error;

/// Errors that can occur while evaluating, refining or fitting curves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    /// A divisor collapsed below the numeric tolerance.
    #[error("divisor is almost zero")]
    DivisorEqualZero,

    /// The bulge value cannot describe an arc.
    #[error("illegal arc bulge: {bulge}")]
    IllegalArcBulge {
        /// The offending bulge value.
        bulge: f64,
    },

    /// The NURBS curve data is inconsistent or a parameter is out of range.
    #[error("invalid nurbs parameters: {0}")]
    NurbsParams(&'static str),

    /// The Bezier curve data is inconsistent.
    #[error("invalid bezier parameters: {0}")]
    BezierParams(&'static str),

    /// Biarc fitting received degenerate input.
    #[error("invalid biarc fit parameters: {0}")]
    BiarcFitParams(&'static str),

    /// The curve degree is too low for the requested operation.
    #[error("curve degree {degree} is too low for this operation")]
    WrongDegree {
        /// Degree of the offending curve.
        degree: usize,
    },

    /// The deflection must be strictly positive.
    #[error("deflection must be positive, got {deflection}")]
    WrongDeflection {
        /// The offending deflection value.
        deflection: f64,
    },

    /// The interpolation system has no unique solution.
    #[error("interpolation system is singular")]
    SingularSystem,
}
