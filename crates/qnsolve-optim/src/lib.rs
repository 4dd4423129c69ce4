//! Quasi-Newton and first-order solvers built on `qnsolve-core`.
//!
//! # Available Optimizers
//!
//! - **L-BFGS**: Limited memory Broyden-Fletcher-Goldfarb-Shanno with a
//!   backtracking Armijo, Wolfe or strong-Wolfe line search
//! - **Gradient Descent**: adaptive-step fallback sharing the same
//!   objective and monitor contracts
//!
//! # Examples
//!
//! ```rust
//! use qnsolve_core::prelude::*;
//! use qnsolve_optim::{LBFGS, LBFGSConfig};
//!
//! let config = LBFGSConfig::new()
//!     .with_memory_size(10)
//!     .with_line_search_condition(LineSearchCondition::StrongWolfe);
//! let mut solver = LBFGS::<f64>::new(config).unwrap();
//!
//! // f(x) = sum x_i^4, minimized at the origin
//! let mut f = |x: &DVector<f64>, g: &mut DVector<f64>| {
//!     g.copy_from(&x.map(|v| 4.0 * v * v * v));
//!     x.iter().map(|v| v.powi(4)).sum::<f64>()
//! };
//! let mut x = DVector::from_element(3, 1.0);
//! let result = solver.minimize(&mut f, &mut x).unwrap();
//! assert!(result.value < 1e-6);
//! ```

pub mod gradient_descent;
pub mod lbfgs;

// Re-export main optimizers for convenience
pub use gradient_descent::{solve_gradient_descent, GradientDescent, GradientDescentConfig};
pub use lbfgs::{LBFGSConfig, LBFGS};

// Re-export commonly used items from core
pub use qnsolve_core::{
    callback::IterationMonitor,
    line_search::{BacktrackingLineSearch, LineSearchCondition, LineSearchParams},
    optimizer::{OptimizationResult, TerminationReason},
};
