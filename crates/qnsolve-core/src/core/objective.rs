//! Objective function interface for optimization algorithms.
//!
//! The solvers only ever need one thing from the problem: the value of the
//! objective at a point together with its gradient. [`Objective`] captures
//! that contract. Closures of the shape
//! `FnMut(&DVector<T>, &mut DVector<T>) -> T` implement it directly, so most
//! callers never write an `impl` block.
//!
//! # Example
//!
//! ```rust
//! use qnsolve_core::prelude::*;
//!
//! // f(x) = ||x||^2, grad f(x) = 2x
//! let mut f = |x: &DVector<f64>, grad: &mut DVector<f64>| {
//!     grad.copy_from(&(x * 2.0));
//!     x.norm_squared()
//! };
//! let x = DVector::from_vec(vec![1.0, 2.0]);
//! let mut grad = DVector::zeros(2);
//! assert_eq!(f.evaluate(&x, &mut grad), 5.0);
//! assert_eq!(grad[1], 4.0);
//! ```

use crate::types::{DVector, Scalar};
use num_traits::Float;

/// Trait for objective functions.
///
/// `evaluate` returns `f(x)` and writes `∇f(x)` into `gradient`, which the
/// caller has already sized to `x.len()`. Implementations may keep mutable
/// state (caches, counters); the solvers call them strictly sequentially and
/// expect the same output for the same `x`.
pub trait Objective<T: Scalar> {
    /// Evaluates the objective and its gradient at `x`.
    fn evaluate(&mut self, x: &DVector<T>, gradient: &mut DVector<T>) -> T;
}

impl<T, F> Objective<T> for F
where
    T: Scalar,
    F: FnMut(&DVector<T>, &mut DVector<T>) -> T,
{
    fn evaluate(&mut self, x: &DVector<T>, gradient: &mut DVector<T>) -> T {
        self(x, gradient)
    }
}

/// Wrapper that counts objective evaluations.
///
/// Useful for comparing solver configurations and for asserting how many
/// times a line search sampled the function.
#[derive(Debug, Clone)]
pub struct CountingObjective<O> {
    inner: O,
    evaluations: usize,
}

impl<O> CountingObjective<O> {
    /// Wraps an objective with a zeroed counter.
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            evaluations: 0,
        }
    }

    /// Number of evaluations performed so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Resets the counter to zero.
    pub fn reset_count(&mut self) {
        self.evaluations = 0;
    }

    /// Returns the wrapped objective.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<T, O> Objective<T> for CountingObjective<O>
where
    T: Scalar,
    O: Objective<T>,
{
    fn evaluate(&mut self, x: &DVector<T>, gradient: &mut DVector<T>) -> T {
        self.evaluations += 1;
        self.inner.evaluate(x, gradient)
    }
}

/// Compares the analytic gradient with central finite differences.
///
/// Returns the largest absolute component-wise deviation between the
/// gradient reported by `objective` at `x` and the numerical estimate
/// `(f(x + h e_i) - f(x - h e_i)) / 2h`.
pub fn gradient_error<T, O>(objective: &mut O, x: &DVector<T>, h: T) -> T
where
    T: Scalar,
    O: Objective<T> + ?Sized,
{
    let n = x.len();
    let mut analytic = DVector::zeros(n);
    objective.evaluate(x, &mut analytic);

    let mut scratch = DVector::zeros(n);
    let mut probe = x.clone();
    let two_h = h + h;
    let mut worst = T::zero();

    for i in 0..n {
        let xi = probe[i];
        probe[i] = xi + h;
        let f_plus = objective.evaluate(&probe, &mut scratch);
        probe[i] = xi - h;
        let f_minus = objective.evaluate(&probe, &mut scratch);
        probe[i] = xi;

        let numerical = (f_plus - f_minus) / two_h;
        worst = <T as Float>::max(worst, <T as Float>::abs(numerical - analytic[i]));
    }

    worst
}
