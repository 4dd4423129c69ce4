//! Standard objectives for testing and benchmarking solvers.
//!
//! Only compiled for tests or with the `test-utils` feature.

use crate::{
    objective::Objective,
    types::{DVector, Scalar},
};

/// `f(x) = ||x - d||^2` with `d = [0, 1, ..., n-1]`.
///
/// The unique minimizer is `d` with `f(d) = 0`.
#[derive(Debug, Clone)]
pub struct ShiftedQuadratic<T: Scalar> {
    target: DVector<T>,
}

impl<T: Scalar> ShiftedQuadratic<T> {
    /// Creates the objective in dimension `n`.
    pub fn new(n: usize) -> Self {
        Self {
            target: DVector::from_fn(n, |i, _| <T as Scalar>::from_usize(i)),
        }
    }

    /// The minimizer `d`.
    pub fn target(&self) -> &DVector<T> {
        &self.target
    }
}

impl<T: Scalar> Objective<T> for ShiftedQuadratic<T> {
    fn evaluate(&mut self, x: &DVector<T>, gradient: &mut DVector<T>) -> T {
        let diff = x - &self.target;
        let two = T::one() + T::one();
        gradient.copy_from(&(&diff * two));
        diff.norm_squared()
    }
}

/// Rosenbrock function over consecutive 2-variable blocks.
///
/// `f(x) = Σ_i (1 - x_{2i})² + 100 (x_{2i+1} - x_{2i}²)²` for even `n`,
/// minimized at `x = [1, ..., 1]` with `f = 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rosenbrock;

impl<T: Scalar> Objective<T> for Rosenbrock {
    fn evaluate(&mut self, x: &DVector<T>, gradient: &mut DVector<T>) -> T {
        let n = x.len();
        debug_assert!(n % 2 == 0, "Rosenbrock blocks need an even dimension");

        let one = T::one();
        let two = one + one;
        let ten = <T as Scalar>::from_f64(10.0);
        let twenty = <T as Scalar>::from_f64(20.0);

        let mut fx = T::zero();
        for i in (0..n).step_by(2) {
            let t1 = one - x[i];
            let t2 = ten * (x[i + 1] - x[i] * x[i]);
            gradient[i + 1] = twenty * t2;
            gradient[i] = -two * (x[i] * gradient[i + 1] + t1);
            fx += t1 * t1 + t2 * t2;
        }
        fx
    }
}
