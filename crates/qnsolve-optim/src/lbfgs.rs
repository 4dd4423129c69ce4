//! Limited-memory BFGS optimizer.
//!
//! L-BFGS (Limited-memory Broyden-Fletcher-Goldfarb-Shanno) is a quasi-Newton
//! algorithm that approximates the inverse Hessian using the `m` most recent
//! position and gradient differences instead of a dense `n × n` matrix.
//!
//! # Algorithm Overview
//!
//! 1. Evaluate `f` and `∇f` at the starting point; stop if already stationary
//! 2. Search along `d = -∇f` with initial step `1 / ||d||`
//! 3. Store `s = x_{k+1} - x_k` and `y = g_{k+1} - g_k` in a ring buffer
//! 4. Compute the next direction with the two-loop recursion
//! 5. Repeat from the line search with initial step 1
//!
//! ## Two-Loop Recursion
//!
//! ```text
//! q = -g
//! for i = k-1, k-2, ..., k-bound:
//!     α_i = <s_i, q> / <y_i, s_i>
//!     q = q - α_i * y_i
//!
//! q = (<y_{k-1}, s_{k-1}> / <y_{k-1}, y_{k-1}>) * q
//!
//! for i = k-bound, ..., k-1:
//!     β = <y_i, q> / <y_i, s_i>
//!     q = q + (α_i - β) * s_i
//!
//! d = q
//! ```
//!
//! The cost per iteration is `O(bound · n)` with `bound` the number of
//! stored pairs, at most `min(m, k)`.
//!
//! A pair with `<y, s> ≤ 0` would make the implicit inverse Hessian
//! indefinite. Such pairs, which the Armijo test alone does not exclude, are
//! not stored; the next direction is built from the pairs already kept, or
//! is the steepest descent direction with step `1 / ||g||` if there are none.
//!
//! ## Stopping Rules
//!
//! - `||g|| ≤ ε · max(||x||, 1)`
//! - with `past > 0`: `(f_{k-past} - f_k) / f_k < δ`, where `f_0` is the
//!   value at the starting point
//! - `k ≥ max_iterations` when the budget is non-zero
//! - `|<y, y>|` below [`Scalar::CURVATURE_TOLERANCE`]: the best point so far is
//!   returned without an error
//! - the iteration monitor returns `false`
//!
//! # References
//!
//! - Nocedal & Wright, "Numerical Optimization" (2006), Algorithm 7.4
//! - Liu & Nocedal, "On the limited memory BFGS method for large scale
//!   optimization" (1989)

use num_traits::Float;
use qnsolve_core::{
    callback::{IterationMonitor, NoOpMonitor},
    error::{OptimizerError, OptimizerResult},
    line_search::{BacktrackingLineSearch, LineSearch, LineSearchCondition, LineSearchParams},
    memory::CurvatureHistory,
    objective::Objective,
    optimizer::{OptimizationResult, TerminationReason},
    types::{DVector, Scalar},
};
use tracing::{debug, warn};

/// Configuration for the L-BFGS optimizer.
///
/// # Defaults
///
/// `memory_size = 6`, `epsilon = 1e-5`, `past = 0` (disabled), `delta = 0`,
/// `max_iterations = 0` (unbounded), and the default [`LineSearchParams`]
/// (Armijo, `ftol = 1e-4`, `wolfe = 0.9`, steps in `[1e-20, 1e20]`,
/// 20 trials).
#[derive(Debug, Clone, PartialEq)]
pub struct LBFGSConfig<T: Scalar> {
    /// Number of correction pairs to keep (`m`)
    pub memory_size: usize,
    /// Relative gradient-norm tolerance
    pub epsilon: T,
    /// Distance, in iterations, of the relative-decrease test (0 disables it)
    pub past: usize,
    /// Minimum relative decrease over `past` iterations
    pub delta: T,
    /// Iteration budget (0 = unbounded)
    pub max_iterations: usize,
    /// Line search parameters
    pub line_search: LineSearchParams<T>,
}

impl<T: Scalar> Default for LBFGSConfig<T> {
    fn default() -> Self {
        Self {
            memory_size: 6,
            epsilon: T::DEFAULT_GRADIENT_TOLERANCE,
            past: 0,
            delta: T::zero(),
            max_iterations: 0,
            line_search: LineSearchParams::default(),
        }
    }
}

impl<T: Scalar> LBFGSConfig<T> {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the memory size (number of vector pairs to store).
    pub fn with_memory_size(mut self, size: usize) -> Self {
        self.memory_size = size;
        self
    }

    /// Sets the gradient-norm tolerance.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enables the relative-decrease test over `past` iterations.
    pub fn with_relative_decrease(mut self, past: usize, delta: T) -> Self {
        self.past = past;
        self.delta = delta;
        self
    }

    /// Sets the iteration budget (0 = unbounded).
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the line search acceptance test.
    pub fn with_line_search_condition(mut self, condition: LineSearchCondition) -> Self {
        self.line_search.condition = condition;
        self
    }

    /// Replaces all line search parameters.
    pub fn with_line_search(mut self, params: LineSearchParams<T>) -> Self {
        self.line_search = params;
        self
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidConfiguration` if `memory_size` is
    /// zero, `epsilon` or `delta` is negative, or the line search
    /// parameters are invalid.
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.memory_size == 0 {
            return Err(OptimizerError::invalid_configuration(
                "must be positive",
                "m",
                self.memory_size.to_string(),
            ));
        }

        if !(self.epsilon >= T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "must be non-negative",
                "epsilon",
                self.epsilon.to_string(),
            ));
        }

        if !(self.delta >= T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "must be non-negative",
                "delta",
                self.delta.to_string(),
            ));
        }

        self.line_search.validate()
    }
}

/// Per-run buffers of the L-BFGS optimizer.
///
/// Sized by `reset` at the start of every run and then reused in place.
#[derive(Debug, Clone)]
struct LBFGSState<T: Scalar> {
    history: CurvatureHistory<T>,
    grad: DVector<T>,
    xp: DVector<T>,
    gradp: DVector<T>,
    drt: DVector<T>,
    fx_history: Vec<T>,
}

impl<T: Scalar> LBFGSState<T> {
    fn new(memory_size: usize) -> Self {
        Self {
            history: CurvatureHistory::new(0, memory_size),
            grad: DVector::zeros(0),
            xp: DVector::zeros(0),
            gradp: DVector::zeros(0),
            drt: DVector::zeros(0),
            fx_history: Vec::new(),
        }
    }

    fn reset(&mut self, n: usize, past: usize) {
        self.history.reset(n);
        self.grad = DVector::zeros(n);
        self.xp = DVector::zeros(n);
        self.gradp = DVector::zeros(n);
        self.drt = DVector::zeros(n);
        self.fx_history.clear();
        self.fx_history.resize(past, T::zero());
    }

    /// Two-loop recursion: `drt = -H·grad` from the stored pairs.
    ///
    /// The initial inverse Hessian is `ys / yy` of the newest pair.
    fn compute_direction(&mut self) {
        let history = &mut self.history;
        let m = history.capacity();
        let bound = history.len();

        self.drt.copy_from(&self.grad);
        self.drt.neg_mut();

        let Some(newest) = history.newest() else {
            return;
        };

        let mut j = history.end();
        for _ in 0..bound {
            j = (j + m - 1) % m;
            let alpha = history.s(j).dot(&self.drt) / history.ys(j);
            history.set_alpha(j, alpha);
            self.drt.axpy(-alpha, &history.y(j), T::one());
        }

        let yy = history.y(newest).norm_squared();
        self.drt *= history.ys(newest) / yy;

        for _ in 0..bound {
            let beta = history.y(j).dot(&self.drt) / history.ys(j);
            self.drt.axpy(history.alpha(j) - beta, &history.s(j), T::one());
            j = (j + 1) % m;
        }
    }
}

/// Limited-memory BFGS optimizer.
///
/// The solver owns its run buffers, so one instance must not be shared by
/// concurrent runs; independent runs need independent instances. Every call
/// to [`minimize`](Self::minimize) starts from a fresh state.
///
/// # Examples
///
/// ```rust
/// use qnsolve_core::prelude::*;
/// use qnsolve_optim::{LBFGS, LBFGSConfig};
///
/// // f(x) = ||x - 3||^2
/// let mut f = |x: &DVector<f64>, g: &mut DVector<f64>| {
///     let d = x.add_scalar(-3.0);
///     g.copy_from(&(&d * 2.0));
///     d.norm_squared()
/// };
///
/// let mut solver = LBFGS::new(LBFGSConfig::new()).unwrap();
/// let mut x = DVector::zeros(4);
/// let result = solver.minimize(&mut f, &mut x).unwrap();
///
/// assert!(result.converged);
/// assert!((x[0] - 3.0).abs() < 1e-6);
/// ```
#[derive(Debug)]
pub struct LBFGS<T: Scalar, L: LineSearch<T> = BacktrackingLineSearch> {
    config: LBFGSConfig<T>,
    line_search: L,
    state: LBFGSState<T>,
}

impl<T: Scalar> LBFGS<T> {
    /// Creates a new L-BFGS optimizer with the backtracking line search.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration fails validation.
    pub fn new(config: LBFGSConfig<T>) -> OptimizerResult<Self> {
        Self::with_line_search(config, BacktrackingLineSearch)
    }

    /// Creates a new L-BFGS optimizer with default configuration.
    pub fn with_default_config() -> Self {
        let config = LBFGSConfig::default();
        Self {
            state: LBFGSState::new(config.memory_size),
            config,
            line_search: BacktrackingLineSearch,
        }
    }
}

impl<T: Scalar, L: LineSearch<T>> LBFGS<T, L> {
    /// Creates a new L-BFGS optimizer with a custom line search.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration fails validation.
    pub fn with_line_search(config: LBFGSConfig<T>, line_search: L) -> OptimizerResult<Self> {
        config.validate()?;
        Ok(Self {
            state: LBFGSState::new(config.memory_size),
            config,
            line_search,
        })
    }

    /// Returns the optimizer configuration.
    pub fn config(&self) -> &LBFGSConfig<T> {
        &self.config
    }

    /// Returns the optimizer name.
    pub fn name(&self) -> &str {
        "L-BFGS"
    }

    /// Minimizes `objective` starting from `x`.
    ///
    /// `x` is overwritten with the final point. See
    /// [`minimize_with_monitor`](Self::minimize_with_monitor).
    pub fn minimize<O>(
        &mut self,
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
    /// The monitor is consulted at the start of every outer iteration and
    /// once more when the run ends. Returning `false` stops the run with
    /// [`TerminationReason::UserTerminated`].
    ///
    /// # Errors
    ///
    /// Line search errors abort the run. `x` then holds the last trial
    /// point; callers needing atomicity should pass a copy.
    pub fn minimize_with_monitor<O, M>(
        &mut self,
        objective: &mut O,
        x: &mut DVector<T>,
        monitor: &mut M,
    ) -> OptimizerResult<OptimizationResult<T>>
    where
        O: Objective<T> + ?Sized,
        M: IterationMonitor<T> + ?Sized,
    {
        let Self {
            config,
            line_search,
            state,
        } = self;

        let n = x.len();
        let m = config.memory_size;
        state.reset(n, config.past);

        let mut fx = objective.evaluate(x, &mut state.grad);
        let mut evaluations = 1;
        let mut gnorm = state.grad.norm();

        if gnorm <= config.epsilon * <T as Float>::max(x.norm(), T::one()) {
            debug!(fx = Scalar::to_f64(fx), "initial point is already stationary");
            return Ok(OptimizationResult::new(fx, 0, TerminationReason::Converged)
                .with_function_evaluations(evaluations)
                .with_gradient_norm(gnorm));
        }

        if config.past > 0 {
            state.fx_history[0] = fx;
        }

        state.drt.copy_from(&state.grad);
        state.drt.neg_mut();
        let mut step = T::one() / state.drt.norm();
        let mut k = 1;

        let reason = loop {
            if !monitor.on_iteration(k, fx) {
                break TerminationReason::UserTerminated;
            }

            state.xp.copy_from(x);
            state.gradp.copy_from(&state.grad);

            evaluations += line_search.search(
                &mut *objective,
                &mut fx,
                x,
                &mut state.grad,
                &mut step,
                &state.drt,
                &state.xp,
                &config.line_search,
            )?;

            gnorm = state.grad.norm();
            debug!(
                iteration = k,
                fx = Scalar::to_f64(fx),
                gnorm = Scalar::to_f64(gnorm),
                step = Scalar::to_f64(step),
                "L-BFGS iteration"
            );

            if gnorm <= config.epsilon * <T as Float>::max(x.norm(), T::one()) {
                break TerminationReason::Converged;
            }

            if config.past > 0 {
                let slot = k % config.past;
                if k >= config.past && (state.fx_history[slot] - fx) / fx < config.delta {
                    break TerminationReason::FunctionTolerance;
                }
                state.fx_history[slot] = fx;
            }

            if config.max_iterations != 0 && k >= config.max_iterations {
                break TerminationReason::MaxIterations;
            }

            // xp and gradp become s = x - xp and y = grad - gradp.
            state.xp.axpy(T::one(), &*x, -T::one());
            state.gradp.axpy(T::one(), &state.grad, -T::one());
            let ys = state.gradp.dot(&state.xp);
            let yy = state.gradp.norm_squared();
            if <T as Float>::abs(yy) < T::CURVATURE_TOLERANCE {
                warn!(
                    iteration = k,
                    yy = Scalar::to_f64(yy),
                    "curvature breakdown, returning best point so far"
                );
                break TerminationReason::CurvatureBreakdown;
            }

            if ys > T::zero() {
                state.history.push(&state.xp, &state.gradp);
            } else {
                debug!(
                    iteration = k,
                    ys = Scalar::to_f64(ys),
                    "non-positive curvature, pair discarded"
                );
            }

            debug_assert!(state.history.len() <= k.min(m));
            state.compute_direction();
            step = if state.history.is_empty() {
                T::one() / state.drt.norm()
            } else {
                T::one()
            };
            k += 1;
        };

        monitor.on_iteration(k, fx);
        debug!(
            iterations = k,
            fx = Scalar::to_f64(fx),
            evaluations,
            %reason,
            "L-BFGS finished"
        );

        Ok(OptimizationResult::new(fx, k, reason)
            .with_function_evaluations(evaluations)
            .with_gradient_norm(gnorm))
    }
}
