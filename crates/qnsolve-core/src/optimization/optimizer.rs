//! Optimization results and termination reasons.
//!
//! The solvers mutate the caller's point in place, so a result carries
//! everything except the point: the final value, iteration and evaluation
//! counts, and the reason the run stopped.

use crate::types::Scalar;
use std::fmt;

/// Reason for termination of the optimization algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Gradient norm fell below `epsilon * max(||x||, 1)`
    Converged,
    /// Relative or absolute change of the objective fell below tolerance
    FunctionTolerance,
    /// Iteration budget exhausted
    MaxIterations,
    /// `dot(y, y)` vanished; the best point so far is returned
    CurvatureBreakdown,
    /// The iteration monitor requested a stop
    UserTerminated,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Converged => "gradient tolerance reached",
            Self::FunctionTolerance => "function tolerance reached",
            Self::MaxIterations => "maximum iterations reached",
            Self::CurvatureBreakdown => "curvature breakdown",
            Self::UserTerminated => "stopped by monitor",
        };
        f.write_str(text)
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult<T>
where
    T: Scalar,
{
    /// The objective value at the final point
    pub value: T,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of objective evaluations
    pub function_evaluations: usize,

    /// The gradient norm at the final point (if available)
    pub gradient_norm: Option<T>,

    /// Final adaptive step size (gradient descent only)
    pub step_size: Option<T>,

    /// Reason for termination
    pub termination_reason: TerminationReason,

    /// Whether the run satisfied a convergence test
    pub converged: bool,
}

impl<T> OptimizationResult<T>
where
    T: Scalar,
{
    /// Creates a new optimization result.
    pub fn new(value: T, iterations: usize, termination_reason: TerminationReason) -> Self {
        let converged = matches!(
            termination_reason,
            TerminationReason::Converged | TerminationReason::FunctionTolerance
        );

        Self {
            value,
            iterations,
            function_evaluations: 0,
            gradient_norm: None,
            step_size: None,
            termination_reason,
            converged,
        }
    }

    /// Sets the function evaluation count.
    pub fn with_function_evaluations(mut self, count: usize) -> Self {
        self.function_evaluations = count;
        self
    }

    /// Sets the gradient norm at the final point.
    pub fn with_gradient_norm(mut self, norm: T) -> Self {
        self.gradient_norm = Some(norm);
        self
    }

    /// Sets the final step size.
    pub fn with_step_size(mut self, step: T) -> Self {
        self.step_size = Some(step);
        self
    }
}
