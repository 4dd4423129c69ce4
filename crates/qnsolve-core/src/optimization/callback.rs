//! Iteration monitors for optimization algorithms.
//!
//! A monitor sees the iteration counter and the current objective value
//! once per outer iteration and decides whether the solver may continue.
//! It can never interrupt a line search in progress.

use crate::types::Scalar;

/// Trait for iteration monitors.
///
/// Return `true` to continue optimization, `false` to stop early. Any
/// `FnMut(usize, T) -> bool` closure is a monitor.
pub trait IterationMonitor<T: Scalar> {
    /// Called with the iteration index `k` and the current value `fx`.
    fn on_iteration(&mut self, iteration: usize, value: T) -> bool;
}

impl<T, F> IterationMonitor<T> for F
where
    T: Scalar,
    F: FnMut(usize, T) -> bool,
{
    fn on_iteration(&mut self, iteration: usize, value: T) -> bool {
        self(iteration, value)
    }
}

/// A monitor that never stops the solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMonitor;

impl<T: Scalar> IterationMonitor<T> for NoOpMonitor {
    fn on_iteration(&mut self, _iteration: usize, _value: T) -> bool {
        true
    }
}

/// A monitor that reports progress through `tracing`.
#[derive(Debug, Clone, Copy)]
pub struct LoggingMonitor {
    every: usize,
}

impl LoggingMonitor {
    /// Emits one `info` event every `every` iterations.
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl<T: Scalar> IterationMonitor<T> for LoggingMonitor {
    fn on_iteration(&mut self, iteration: usize, value: T) -> bool {
        if iteration % self.every == 0 {
            tracing::info!(iteration, value = Scalar::to_f64(value), "optimization progress");
        }
        true
    }
}

/// A monitor that records every `(k, fx)` pair it is shown.
#[derive(Debug, Clone, Default)]
pub struct RecordingMonitor<T: Scalar> {
    trace: Vec<(usize, T)>,
    stop_after: Option<usize>,
}

impl<T: Scalar> RecordingMonitor<T> {
    /// Creates a recorder that never requests a stop.
    pub fn new() -> Self {
        Self {
            trace: Vec::new(),
            stop_after: None,
        }
    }

    /// Creates a recorder that requests a stop once it has seen `calls` calls.
    pub fn stopping_after(calls: usize) -> Self {
        Self {
            trace: Vec::new(),
            stop_after: Some(calls),
        }
    }

    /// The recorded `(k, fx)` pairs, in call order.
    pub fn trace(&self) -> &[(usize, T)] {
        &self.trace
    }

    /// The recorded objective values, in call order.
    pub fn values(&self) -> Vec<T> {
        self.trace.iter().map(|&(_, v)| v).collect()
    }
}

impl<T: Scalar> IterationMonitor<T> for RecordingMonitor<T> {
    fn on_iteration(&mut self, iteration: usize, value: T) -> bool {
        self.trace.push((iteration, value));
        match self.stop_after {
            Some(limit) => self.trace.len() < limit,
            None => true,
        }
    }
}
