//! Circular storage for L-BFGS correction pairs.
//!
//! The history keeps the `m` most recent position differences
//! `s_k = x_{k+1} - x_k` and gradient differences `y_k = g_{k+1} - g_k` as
//! the columns of two pre-allocated `n × m` matrices. Slots are reused in
//! ring order, so pushing a pair never reallocates or shifts memory.
//!
//! ```text
//!  column:   0     1     2     3     4     5
//!  S:      [s_6] [s_7] [s_2] [s_3] [s_4] [s_5]
//!                       ^ end (next slot to overwrite)
//! ```
//!
//! Only pairs the solver decides to keep are pushed, so a rejected pair never
//! touches the stored ones.

use crate::types::{DMatrix, DVector, Scalar};

/// Ring buffer of `(s, y)` correction pairs with their curvature `ys`.
#[derive(Debug, Clone)]
pub struct CurvatureHistory<T: Scalar> {
    /// Position differences, one per column
    s: DMatrix<T>,
    /// Gradient differences, one per column
    y: DMatrix<T>,
    /// `dot(y_j, s_j)` for every slot
    ys: DVector<T>,
    /// Scratch coefficients of the backward recursion pass
    alpha: DVector<T>,
    /// Slot written by the next `push`
    end: usize,
    /// Number of valid pairs, at most `m`
    len: usize,
}

impl<T: Scalar> CurvatureHistory<T> {
    /// Allocates an empty history for `n`-dimensional points and `m` pairs.
    pub fn new(n: usize, m: usize) -> Self {
        debug_assert!(m > 0, "history length m must be > 0");
        Self {
            s: DMatrix::zeros(n, m),
            y: DMatrix::zeros(n, m),
            ys: DVector::zeros(m),
            alpha: DVector::zeros(m),
            end: 0,
            len: 0,
        }
    }

    /// Clears the history and re-sizes it for `n`-dimensional points.
    ///
    /// Buffers are only reallocated when the dimension changes.
    pub fn reset(&mut self, n: usize) {
        let m = self.capacity();
        if self.s.nrows() != n {
            self.s = DMatrix::zeros(n, m);
            self.y = DMatrix::zeros(n, m);
        } else {
            self.s.fill(T::zero());
            self.y.fill(T::zero());
        }
        self.ys.fill(T::zero());
        self.alpha.fill(T::zero());
        self.end = 0;
        self.len = 0;
    }

    /// Maximum number of stored pairs (`m`).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ys.len()
    }

    /// Dimension of the stored vectors (`n`).
    #[inline]
    pub fn dimension(&self) -> usize {
        self.s.nrows()
    }

    /// Number of valid pairs (`bound = min(m, k)`).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` before the first pair has been committed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slot that the next `push` overwrites.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Stores the pair `(s, y)` in slot `end` and commits it.
    ///
    /// Once the buffer is full the oldest pair is overwritten. Returns
    /// `ys = dot(y, s)`.
    pub fn push(&mut self, s: &DVector<T>, y: &DVector<T>) -> T {
        let m = self.capacity();
        let end = self.end;
        self.s.column_mut(end).copy_from(s);
        self.y.column_mut(end).copy_from(y);

        let ys = y.dot(s);
        self.ys[end] = ys;
        self.end = (end + 1) % m;
        self.len = (self.len + 1).min(m);
        ys
    }

    /// Slot holding the most recently committed pair.
    pub fn newest(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            let m = self.capacity();
            Some((self.end + m - 1) % m)
        }
    }

    /// Position difference stored in slot `j`.
    #[inline]
    pub fn s(&self, j: usize) -> nalgebra::DVectorView<'_, T> {
        self.s.column(j)
    }

    /// Gradient difference stored in slot `j`.
    #[inline]
    pub fn y(&self, j: usize) -> nalgebra::DVectorView<'_, T> {
        self.y.column(j)
    }

    /// Curvature `dot(y_j, s_j)` of slot `j`.
    #[inline]
    pub fn ys(&self, j: usize) -> T {
        self.ys[j]
    }

    /// Recursion coefficient of slot `j`.
    #[inline]
    pub fn alpha(&self, j: usize) -> T {
        self.alpha[j]
    }

    /// Stores the recursion coefficient of slot `j`.
    #[inline]
    pub fn set_alpha(&mut self, j: usize, value: T) {
        self.alpha[j] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vec3(a: f64, b: f64, c: f64) -> DVector<f64> {
        DVector::from_vec(vec![a, b, c])
    }

    #[test]
    fn test_push_stores_pair() {
        let mut history = CurvatureHistory::<f64>::new(3, 2);
        assert!(history.is_empty());
        assert_eq!(history.newest(), None);

        let ys = history.push(&vec3(1.0, 2.0, 3.0), &vec3(1.0, 1.0, 1.0));

        assert_relative_eq!(ys, 6.0);
        assert_relative_eq!(history.ys(0), 6.0);
        assert_relative_eq!(history.s(0)[2], 3.0);
        assert_relative_eq!(history.y(0)[0], 1.0);
        assert_eq!(history.end(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.newest(), Some(0));
    }

    #[test]
    fn test_ring_wraps_and_overwrites_oldest() {
        let mut history = CurvatureHistory::<f64>::new(1, 3);

        for k in 1..=5 {
            let v = DVector::from_element(1, k as f64);
            history.push(&v, &v);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.end(), 2);
        // Slots 2, 0, 1 hold the pairs from k = 3, 4, 5.
        assert_relative_eq!(history.s(2)[0], 3.0);
        assert_relative_eq!(history.s(0)[0], 4.0);
        assert_relative_eq!(history.s(1)[0], 5.0);
        assert_relative_eq!(history.ys(1), 25.0);
        assert_eq!(history.newest(), Some(1));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut history = CurvatureHistory::<f64>::new(2, 2);
        let v = DVector::from_vec(vec![1.0, 1.0]);
        history.push(&v, &v);
        history.set_alpha(0, 3.0);

        history.reset(2);
        assert!(history.is_empty());
        assert_eq!(history.end(), 0);
        assert_eq!(history.ys(0), 0.0);
        assert_eq!(history.alpha(0), 0.0);

        history.reset(5);
        assert_eq!(history.dimension(), 5);
        assert_eq!(history.capacity(), 2);
    }
}
