//! Gradient descent with an adaptive step size.
//!
//! A fallback for problems where curvature information is unnecessary or
//! unreliable. The solver keeps a single step size and the gradient of the
//! last accepted point:
//!
//! ```text
//! x_trial = x - step * g
//! if f(x_trial) < f_best:  x = x_trial, g = ∇f(x_trial)
//! else:                    step = shrink * step
//! ```
//!
//! After a rejected trial the old gradient is reused with the smaller step,
//! so every iteration costs exactly one evaluation. The run stops when the
//! trial value changes the best value by at most `tolerance`, when the
//! iteration budget is spent, or when the monitor asks to stop.

use num_traits::Float;
use qnsolve_core::{
    callback::{IterationMonitor, NoOpMonitor},
    error::{OptimizerError, OptimizerResult},
    objective::Objective,
    optimizer::{OptimizationResult, TerminationReason},
    types::{DVector, Scalar},
};
use tracing::{debug, trace};

/// Configuration for the gradient descent optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientDescentConfig<T>
where
    T: Scalar,
{
    /// Iteration budget (one evaluation per iteration)
    pub max_iterations: usize,

    /// Step size of the first trial
    pub initial_step_size: T,

    /// Factor applied to the step after a rejected trial
    pub shrink_factor: T,

    /// Stop once `|f(x_trial) - f_best|` is at most this value
    pub tolerance: T,
}

impl<T> Default for GradientDescentConfig<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            initial_step_size: <T as Scalar>::from_f64(0.01),
            shrink_factor: <T as Scalar>::from_f64(0.8),
            tolerance: T::DESCENT_TOLERANCE,
        }
    }
}

impl<T> GradientDescentConfig<T>
where
    T: Scalar,
{
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the initial step size.
    pub fn with_step_size(mut self, step_size: T) -> Self {
        self.initial_step_size = step_size;
        self
    }

    /// Sets the shrink factor.
    pub fn with_shrink_factor(mut self, factor: T) -> Self {
        self.shrink_factor = factor;
        self
    }

    /// Sets the stopping tolerance.
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a non-positive step, a shrink
    /// factor outside `(0, 1)` or a negative tolerance.
    pub fn validate(&self) -> OptimizerResult<()> {
        if !(self.initial_step_size > T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "must be positive",
                "step_size",
                self.initial_step_size.to_string(),
            ));
        }

        if !(self.shrink_factor > T::zero() && self.shrink_factor < T::one()) {
            return Err(OptimizerError::invalid_configuration(
                "must lie in (0, 1)",
                "shrink_factor",
                self.shrink_factor.to_string(),
            ));
        }

        if !(self.tolerance >= T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "must be non-negative",
                "tolerance",
                self.tolerance.to_string(),
            ));
        }

        Ok(())
    }
}

/// Gradient descent optimizer with step shrinking on rejection.
#[derive(Debug, Clone)]
pub struct GradientDescent<T>
where
    T: Scalar,
{
    config: GradientDescentConfig<T>,
}

impl<T> GradientDescent<T>
where
    T: Scalar,
{
    /// Creates a new optimizer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration fails validation.
    pub fn new(config: GradientDescentConfig<T>) -> OptimizerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the optimizer configuration.
    pub fn config(&self) -> &GradientDescentConfig<T> {
        &self.config
    }

    /// Returns the optimizer name.
    pub fn name(&self) -> &str {
        "Gradient Descent"
    }

    /// Minimizes `objective` starting from `x`, which receives the best point.
    pub fn minimize<O>(
        &self,
        objective: &mut O,
        x: &mut DVector<T>,
    ) -> OptimizerResult<OptimizationResult<T>>
    where
        O: Objective<T> + ?Sized,
    {
        self.minimize_with_monitor(objective, x, &mut NoOpMonitor)
    }

    /// Minimizes `objective` starting from `x`, reporting to `monitor`.
    ///
    /// The monitor sees `(k, f_best)` after every iteration, including the
    /// last one; returning `false` ends the run with
    /// [`TerminationReason::UserTerminated`] unless that iteration converged.
    pub fn minimize_with_monitor<O, M>(
        &self,
        objective: &mut O,
        x: &mut DVector<T>,
        monitor: &mut M,
    ) -> OptimizerResult<OptimizationResult<T>>
    where
        O: Objective<T> + ?Sized,
        M: IterationMonitor<T> + ?Sized,
    {
        let n = x.len();
        let mut step = self.config.initial_step_size;
        let mut best = T::infinity();
        let mut grad = DVector::zeros(n);
        let mut trial_grad = DVector::zeros(n);
        let mut trial = x.clone();

        let mut iterations = 0;
        let mut reason = TerminationReason::MaxIterations;

        for k in 1..=self.config.max_iterations {
            iterations = k;

            trial.copy_from(x);
            trial.axpy(-step, &grad, T::one());
            let fx = objective.evaluate(&trial, &mut trial_grad);
            let converged = <T as Float>::abs(fx - best) <= self.config.tolerance;

            if fx < best {
                x.copy_from(&trial);
                best = fx;
                std::mem::swap(&mut grad, &mut trial_grad);
            } else {
                step *= self.config.shrink_factor;
                trace!(
                    iteration = k,
                    fx = Scalar::to_f64(fx),
                    step = Scalar::to_f64(step),
                    "trial rejected, shrinking step"
                );
            }

            let proceed = monitor.on_iteration(k, best);
            if converged {
                reason = TerminationReason::FunctionTolerance;
                break;
            }
            if !proceed {
                reason = TerminationReason::UserTerminated;
                break;
            }
        }

        debug!(
            iterations,
            fx = Scalar::to_f64(best),
            step = Scalar::to_f64(step),
            %reason,
            "gradient descent finished"
        );

        Ok(OptimizationResult::new(best, iterations, reason)
            .with_function_evaluations(iterations)
            .with_gradient_norm(grad.norm())
            .with_step_size(step))
    }
}

/// Runs gradient descent from `x` for at most `iterations` iterations.
///
/// Shorthand for [`GradientDescent`] with the default shrink factor and
/// tolerance.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `step_size` is not positive.
pub fn solve_gradient_descent<T, O>(
    objective: &mut O,
    x: &mut DVector<T>,
    iterations: usize,
    step_size: T,
) -> OptimizerResult<OptimizationResult<T>>
where
    T: Scalar,
    O: Objective<T> + ?Sized,
{
    let config = GradientDescentConfig::new()
        .with_max_iterations(iterations)
        .with_step_size(step_size);
    GradientDescent::new(config)?.minimize(objective, x)
}
