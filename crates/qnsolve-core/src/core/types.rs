//! Type definitions and aliases for quasi-Newton optimization.
//!
//! This module provides the scalar abstraction shared by every solver,
//! the dense vector and matrix aliases, and the per-precision constants
//! that fix tolerances and step bounds.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in optimization (f32 or f64).
///
/// This trait combines all the numeric traits required by the line search
/// and the solvers, and carries the constants whose values depend on the
/// floating-point precision.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Default tolerance for the relative gradient-norm stopping test.
    const DEFAULT_GRADIENT_TOLERANCE: Self;

    /// Smallest step the line search may take before giving up.
    const MIN_STEP_SIZE: Self;

    /// Largest step the line search may take before giving up.
    const MAX_STEP_SIZE: Self;

    /// Threshold under which `dot(y, y)` counts as a curvature breakdown.
    const CURVATURE_TOLERANCE: Self;

    /// Stopping tolerance on the change of the objective in gradient descent.
    const DESCENT_TOLERANCE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Convert to f64 (for logging and error reports).
    ///
    /// Values that cannot be represented map to NaN.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).unwrap_or(f64::NAN)
    }

    /// Convert from usize (for iteration counts).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-5;
    const MIN_STEP_SIZE: Self = 1e-20;
    const MAX_STEP_SIZE: Self = 1e20;
    const CURVATURE_TOLERANCE: Self = 1e-12;
    const DESCENT_TOLERANCE: Self = 1e-5;
}

impl Scalar for f64 {
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-5;
    const MIN_STEP_SIZE: Self = 1e-20;
    const MAX_STEP_SIZE: Self = 1e20;
    const CURVATURE_TOLERANCE: Self = 1e-20;
    const DESCENT_TOLERANCE: Self = 1e-10;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;
