//! Backtracking line search.
//!
//! Given a base point `xp`, its value and gradient, and a descent direction
//! `d`, the line search looks for a step `α` along `x = xp + α d` that
//! satisfies one of three acceptance tests:
//!
//! ### Armijo condition (sufficient decrease)
//! f(xp + α d) ≤ f(xp) + c₁ α ∇f(xp)ᵀd
//!
//! ### Wolfe conditions
//! Armijo, plus the curvature condition
//! ∇f(xp + α d)ᵀd ≥ c₂ ∇f(xp)ᵀd
//!
//! ### Strong Wolfe conditions
//! Armijo, plus
//! |∇f(xp + α d)ᵀd| ≤ c₂ |∇f(xp)ᵀd|
//!
//! with 0 < c₁ < 0.5 and c₁ < c₂ < 1 (`ftol` and `wolfe` below).
//!
//! The step shrinks by a factor 0.5 whenever the decrease is insufficient
//! or the strong curvature bound is exceeded, and grows by 2.1 while the
//! directional derivative is still too negative. Every trial costs exactly
//! one objective evaluation.
//!
//! # Example
//!
//! ```rust
//! use qnsolve_core::prelude::*;
//!
//! let mut f = |x: &DVector<f64>, g: &mut DVector<f64>| {
//!     g.copy_from(&(x * 2.0));
//!     x.norm_squared()
//! };
//! let xp = DVector::from_vec(vec![1.0]);
//! let mut x = xp.clone();
//! let mut grad = DVector::zeros(1);
//! let mut fx = f(&x, &mut grad);
//! let drt = -&grad;
//! let mut step = 1.0;
//!
//! let params = LineSearchParams::<f64>::default();
//! BacktrackingLineSearch
//!     .search(&mut f, &mut fx, &mut x, &mut grad, &mut step, &drt, &xp, &params)
//!     .unwrap();
//! assert_eq!(step, 0.5);
//! assert_eq!(fx, 0.0);
//! ```

use crate::{
    error::{LineSearchFailure, OptimizerError, OptimizerResult},
    objective::Objective,
    types::{DVector, Scalar},
};
use std::fmt::Debug;

/// Factor applied to the step when a trial is too long.
const DECREASE_FACTOR: f64 = 0.5;

/// Factor applied to the step when a trial is too short.
const INCREASE_FACTOR: f64 = 2.1;

/// Acceptance test used by the line search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearchCondition {
    /// Sufficient decrease only
    #[default]
    Armijo,
    /// Sufficient decrease and the curvature condition
    Wolfe,
    /// Sufficient decrease and the strong curvature condition
    StrongWolfe,
}

/// Parameters of the backtracking line search.
///
/// # Defaults
///
/// | field            | value  |
/// |------------------|--------|
/// | `condition`      | Armijo |
/// | `ftol`           | 1e-4   |
/// | `wolfe`          | 0.9    |
/// | `min_step`       | 1e-20  |
/// | `max_step`       | 1e20   |
/// | `max_iterations` | 20     |
#[derive(Debug, Clone, PartialEq)]
pub struct LineSearchParams<T>
where
    T: Scalar,
{
    /// Acceptance test
    pub condition: LineSearchCondition,

    /// Armijo parameter c₁ ∈ (0, 0.5)
    pub ftol: T,

    /// Curvature parameter c₂ ∈ (ftol, 1)
    pub wolfe: T,

    /// The search fails once the step drops below this value
    pub min_step: T,

    /// The search fails once the step exceeds this value
    pub max_step: T,

    /// Maximum number of trials per search (`max_linesearch`)
    pub max_iterations: usize,
}

impl<T> Default for LineSearchParams<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            condition: LineSearchCondition::Armijo,
            ftol: <T as Scalar>::from_f64(1e-4),
            wolfe: <T as Scalar>::from_f64(0.9),
            min_step: T::MIN_STEP_SIZE,
            max_step: T::MAX_STEP_SIZE,
            max_iterations: 20,
        }
    }
}

impl<T> LineSearchParams<T>
where
    T: Scalar,
{
    /// Creates parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default parameters with the Armijo test.
    pub fn armijo() -> Self {
        Self::default()
    }

    /// Default parameters with the Wolfe test.
    pub fn wolfe() -> Self {
        Self::default().with_condition(LineSearchCondition::Wolfe)
    }

    /// Default parameters with the strong Wolfe test.
    pub fn strong_wolfe() -> Self {
        Self::default().with_condition(LineSearchCondition::StrongWolfe)
    }

    /// Sets the acceptance test.
    pub fn with_condition(mut self, condition: LineSearchCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Sets the Armijo parameter.
    pub fn with_ftol(mut self, ftol: T) -> Self {
        self.ftol = ftol;
        self
    }

    /// Sets the curvature parameter.
    pub fn with_wolfe(mut self, wolfe: T) -> Self {
        self.wolfe = wolfe;
        self
    }

    /// Sets the admissible step range.
    pub fn with_step_bounds(mut self, min_step: T, max_step: T) -> Self {
        self.min_step = min_step;
        self.max_step = max_step;
        self
    }

    /// Sets the maximum number of trials.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidConfiguration` if:
    /// - `max_iterations` is zero
    /// - `min_step <= 0` or `max_step <= min_step`
    /// - `ftol` is outside `(0, 0.5)`
    /// - `wolfe` is outside `(ftol, 1)`
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.max_iterations == 0 {
            return Err(OptimizerError::invalid_configuration(
                "must be positive",
                "max_linesearch",
                self.max_iterations.to_string(),
            ));
        }

        if !(self.min_step > T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "must be positive",
                "min_step",
                self.min_step.to_string(),
            ));
        }

        if !(self.max_step > self.min_step) {
            return Err(OptimizerError::invalid_configuration(
                "must be greater than min_step",
                "max_step",
                self.max_step.to_string(),
            ));
        }

        if !(self.ftol > T::zero() && self.ftol < <T as Scalar>::from_f64(0.5)) {
            return Err(OptimizerError::invalid_configuration(
                "must satisfy 0 < ftol < 0.5",
                "ftol",
                self.ftol.to_string(),
            ));
        }

        if !(self.wolfe > self.ftol && self.wolfe < T::one()) {
            return Err(OptimizerError::invalid_configuration(
                "must satisfy ftol < wolfe < 1",
                "wolfe",
                self.wolfe.to_string(),
            ));
        }

        Ok(())
    }
}

/// Interface for line search algorithms.
///
/// On entry `x`, `grad` and `fx` describe the base point `xp`; `step` holds
/// the initial trial step and `drt` the search direction. On success they
/// describe the accepted point and step. On failure they hold the last
/// trial, and the error tells why the search stopped.
pub trait LineSearch<T>: Debug
where
    T: Scalar,
{
    /// Runs the search and returns the number of objective evaluations.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `step <= 0`
    /// - `InvalidSearchDirection` if `dot(grad, drt) >= 0`
    /// - `LineSearchFailed` if the trial budget or the step bounds are exceeded
    #[allow(clippy::too_many_arguments)]
    fn search<O>(
        &mut self,
        objective: &mut O,
        fx: &mut T,
        x: &mut DVector<T>,
        grad: &mut DVector<T>,
        step: &mut T,
        drt: &DVector<T>,
        xp: &DVector<T>,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<usize>
    where
        O: Objective<T> + ?Sized;

    /// Returns a human-readable name identifying the algorithm.
    fn name(&self) -> &str;
}

/// Backtracking line search with Armijo, Wolfe and strong Wolfe tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingLineSearch;

impl BacktrackingLineSearch {
    /// Creates a new backtracking line search.
    pub fn new() -> Self {
        Self
    }
}

impl<T> LineSearch<T> for BacktrackingLineSearch
where
    T: Scalar,
{
    fn search<O>(
        &mut self,
        objective: &mut O,
        fx: &mut T,
        x: &mut DVector<T>,
        grad: &mut DVector<T>,
        step: &mut T,
        drt: &DVector<T>,
        xp: &DVector<T>,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<usize>
    where
        O: Objective<T> + ?Sized,
    {
        if !(*step > T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "initial line search step must be positive",
                "step",
                step.to_string(),
            ));
        }

        let fx_init = *fx;
        let dg_init = grad.dot(drt);
        if dg_init >= T::zero() {
            return Err(OptimizerError::invalid_search_direction(Scalar::to_f64(dg_init)));
        }

        let dec = <T as Scalar>::from_f64(DECREASE_FACTOR);
        let inc = <T as Scalar>::from_f64(INCREASE_FACTOR);
        let test_decr = params.ftol * dg_init;
        let test_curv = params.wolfe * dg_init;

        let mut iterations = 0;
        loop {
            // x = xp + step * drt
            x.copy_from(xp);
            x.axpy(*step, drt, T::one());
            *fx = objective.evaluate(x, grad);

            // A NaN value never counts as sufficient decrease.
            let width = if !(*fx <= fx_init + *step * test_decr) {
                dec
            } else if params.condition == LineSearchCondition::Armijo {
                return Ok(iterations + 1);
            } else {
                let dg = grad.dot(drt);
                if dg < test_curv {
                    inc
                } else if params.condition == LineSearchCondition::Wolfe {
                    return Ok(iterations + 1);
                } else if dg > -test_curv {
                    dec
                } else {
                    return Ok(iterations + 1);
                }
            };

            iterations += 1;
            let failure = if iterations >= params.max_iterations {
                Some(LineSearchFailure::MaxIterations)
            } else if *step < params.min_step {
                Some(LineSearchFailure::StepTooSmall)
            } else if *step > params.max_step {
                Some(LineSearchFailure::StepTooLarge)
            } else {
                None
            };

            if let Some(reason) = failure {
                tracing::warn!(
                    %reason,
                    iterations,
                    step = Scalar::to_f64(*step),
                    "line search failed"
                );
                return Err(OptimizerError::line_search_failed(
                    reason,
                    iterations,
                    Scalar::to_f64(*step),
                    Scalar::to_f64(fx_init),
                ));
            }

            tracing::trace!(
                trial = iterations,
                step = Scalar::to_f64(*step),
                fx = Scalar::to_f64(*fx),
                "line search trial rejected"
            );
            *step *= width;
        }
    }

    fn name(&self) -> &str {
        "Backtracking"
    }
}
