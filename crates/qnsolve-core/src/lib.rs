//! Core traits and types for quasi-Newton optimization.
//!
//! This crate provides the building blocks shared by the solvers in
//! `qnsolve-optim`: the scalar abstraction, the objective and monitor
//! contracts, the circular curvature history, and the backtracking line
//! search.
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy for optimizer failures
//! - [`objective`]: Objective function interface
//! - [`types`]: Scalar trait, dense aliases and numerical constants
//! - [`memory`]: Ring buffer of L-BFGS correction pairs
//! - [`optimization`]: Line search, iteration monitors and results

pub mod core;
pub mod memory;
pub mod optimization;
pub mod utils;

pub use crate::core::{error, objective, types};
pub use crate::optimization::{callback, line_search, optimizer};

#[cfg(any(test, feature = "test-utils"))]
pub use crate::utils::test_functions;

// Re-export commonly used items at the crate root
pub use error::{ErrorKind, LineSearchFailure, OptimizerError, OptimizerResult};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use qnsolve_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{IterationMonitor, LoggingMonitor, NoOpMonitor, RecordingMonitor};
    pub use crate::error::{ErrorKind, LineSearchFailure, OptimizerError, OptimizerResult};
    pub use crate::line_search::{
        BacktrackingLineSearch, LineSearch, LineSearchCondition, LineSearchParams,
    };
    pub use crate::memory::CurvatureHistory;
    pub use crate::objective::{gradient_error, CountingObjective, Objective};
    pub use crate::optimizer::{OptimizationResult, TerminationReason};
    pub use crate::types::{DMatrix, DVector, Scalar};
}
