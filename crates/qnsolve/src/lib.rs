//! Unconstrained smooth minimization with L-BFGS.
//!
//! This crate bundles `qnsolve-core` (objective and monitor contracts,
//! curvature history, backtracking line search) and `qnsolve-optim`
//! (the L-BFGS and gradient descent solvers) behind one dependency.
//!
//! # Example
//!
//! ```rust
//! use qnsolve::prelude::*;
//!
//! // Two-dimensional Rosenbrock function
//! let mut f = |x: &DVector<f64>, g: &mut DVector<f64>| {
//!     let (a, b) = (x[0], x[1]);
//!     g[0] = -2.0 * (1.0 - a) - 400.0 * a * (b - a * a);
//!     g[1] = 200.0 * (b - a * a);
//!     (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2)
//! };
//!
//! let mut solver = LBFGS::new(LBFGSConfig::new()).unwrap();
//! let mut x = DVector::from_vec(vec![-1.2, 1.0]);
//! let result = solver.minimize(&mut f, &mut x).unwrap();
//!
//! assert!(result.converged);
//! assert!((x[0] - 1.0).abs() < 1e-3);
//! ```

pub use nalgebra;
pub use qnsolve_core;
pub use qnsolve_optim;

pub use qnsolve_core::{ErrorKind, LineSearchFailure, OptimizerError, OptimizerResult};
pub use qnsolve_optim::{
    solve_gradient_descent, GradientDescent, GradientDescentConfig, LBFGSConfig, LBFGS,
};

/// Everything needed to set up and run a solver.
pub mod prelude {
    pub use qnsolve_core::prelude::*;
    pub use qnsolve_optim::{
        solve_gradient_descent, GradientDescent, GradientDescentConfig, LBFGSConfig, LBFGS,
    };
}
