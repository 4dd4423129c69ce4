//! Error types for quasi-Newton optimization.
//!
//! Every failure the solvers can report is a variant of [`OptimizerError`].
//! The variants group into three kinds (see [`ErrorKind`]): malformed
//! arguments, internal logic faults, and line-search divergence. Curvature
//! breakdown and monitor-requested stops are not errors; they terminate a
//! run normally with a [`TerminationReason`](crate::optimization::optimizer::TerminationReason).

use thiserror::Error;

/// Why a backtracking line search gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LineSearchFailure {
    /// The trial budget was exhausted.
    #[error("maximum number of line search iterations reached")]
    MaxIterations,

    /// The step shrank below the configured minimum.
    #[error("the line search step became smaller than the minimum value allowed")]
    StepTooSmall,

    /// The step grew beyond the configured maximum.
    #[error("the line search step became larger than the maximum value allowed")]
    StepTooLarge,
}

/// Coarse classification of optimizer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed parameters or a non-positive initial step.
    InvalidArgument,
    /// The line search was handed a non-descent direction.
    Logic,
    /// The line search failed to find an acceptable step.
    LineSearchDivergence,
}

/// Errors that can occur during optimization.
#[derive(Debug, Clone, Error)]
pub enum OptimizerError {
    /// Invalid optimizer configuration.
    ///
    /// This error occurs when a solver or the line search is configured
    /// with invalid parameters (e.g., zero history length, `wolfe <= ftol`),
    /// or when the line search receives a non-positive initial step.
    #[error("Invalid optimizer configuration: {reason} ({parameter} = {value})")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// Invalid search direction.
    ///
    /// The directional derivative along the search direction was not
    /// negative. A correct two-loop recursion never produces this.
    #[error("Invalid search direction: not a descent direction (dg = {directional_derivative})")]
    InvalidSearchDirection {
        /// The offending value of `dot(grad, drt)`
        directional_derivative: f64,
    },

    /// Line search failed to find an acceptable step.
    #[error("Line search failed: {reason}")]
    LineSearchFailed {
        /// Why the line search stopped
        reason: LineSearchFailure,
        /// Number of trials attempted
        iterations: usize,
        /// Last step size tried
        last_step_size: f64,
        /// Function value at the starting point
        initial_value: f64,
    },
}

impl OptimizerError {
    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create an InvalidSearchDirection error.
    pub fn invalid_search_direction(directional_derivative: f64) -> Self {
        Self::InvalidSearchDirection {
            directional_derivative,
        }
    }

    /// Create a LineSearchFailed error with detailed context.
    pub fn line_search_failed(
        reason: LineSearchFailure,
        iterations: usize,
        last_step_size: f64,
        initial_value: f64,
    ) -> Self {
        Self::LineSearchFailed {
            reason,
            iterations,
            last_step_size,
            initial_value,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration { .. } => ErrorKind::InvalidArgument,
            Self::InvalidSearchDirection { .. } => ErrorKind::Logic,
            Self::LineSearchFailed { .. } => ErrorKind::LineSearchDivergence,
        }
    }
}

/// Result type alias for optimizer operations.
pub type OptimizerResult<T> = std::result::Result<T, OptimizerError>;
