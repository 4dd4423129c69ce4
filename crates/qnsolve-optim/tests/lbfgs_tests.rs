//! Integration tests for the L-BFGS optimizer

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use qnsolve_core::{
    callback::RecordingMonitor,
    error::{ErrorKind, LineSearchFailure, OptimizerError},
    line_search::{LineSearchCondition, LineSearchParams},
    objective::CountingObjective,
    optimizer::TerminationReason,
    test_functions::{Rosenbrock, ShiftedQuadratic},
    types::DVector,
};
use qnsolve_optim::{LBFGSConfig, LBFGS};

fn solve_rosenbrock(condition: LineSearchCondition) -> (DVector<f64>, f64, usize) {
    let config = LBFGSConfig::new().with_line_search_condition(condition);
    let mut solver = LBFGS::new(config).unwrap();
    let mut x = DVector::<f64>::zeros(10);
    let result = solver.minimize(&mut Rosenbrock, &mut x).unwrap();

    assert!(result.converged, "{condition:?}: {}", result.termination_reason);
    (x, result.value, result.iterations)
}

#[test]
fn test_quadratic_with_defaults() {
    let mut f = CountingObjective::new(ShiftedQuadratic::<f64>::new(10));
    let mut x = DVector::zeros(10);
    let mut solver = LBFGS::new(LBFGSConfig::new()).unwrap();

    let result = solver.minimize(&mut f, &mut x).unwrap();

    assert_eq!(result.termination_reason, TerminationReason::Converged);
    assert!(result.value < 1e-6);
    assert!(result.iterations <= 30);
    assert_eq!(result.function_evaluations, f.evaluations());
    let target = DVector::from_fn(10, |i, _| i as f64);
    assert_relative_eq!(x, target, epsilon = 1e-5);
}

#[test]
fn test_quadratic_single_precision() {
    let mut f = ShiftedQuadratic::<f32>::new(10);
    let mut x = DVector::zeros(10);
    let mut solver = LBFGS::new(LBFGSConfig::new()).unwrap();

    let result = solver.minimize(&mut f, &mut x).unwrap();
    assert!(result.value < 1e-4);
}

#[test]
fn test_rosenbrock_armijo() {
    let (x, fx, iterations) = solve_rosenbrock(LineSearchCondition::Armijo);
    assert!(fx < 1e-6);
    assert!(iterations < 300);
    assert_relative_eq!(x, DVector::from_element(10, 1.0), epsilon = 1e-3);
}

#[test]
fn test_rosenbrock_wolfe() {
    let (x, fx, iterations) = solve_rosenbrock(LineSearchCondition::Wolfe);
    assert!(fx < 1e-6);
    assert!(iterations < 300);
    assert_relative_eq!(x, DVector::from_element(10, 1.0), epsilon = 1e-3);
}

#[test]
fn test_rosenbrock_strong_wolfe() {
    let (x, fx, iterations) = solve_rosenbrock(LineSearchCondition::StrongWolfe);
    assert!(fx < 1e-6);
    assert!(iterations < 300);
    assert_relative_eq!(x, DVector::from_element(10, 1.0), epsilon = 1e-3);
}

#[test]
fn test_rosenbrock_2d_every_condition() {
    // From (-1.2, 1) an Armijo step produces a pair with yᵀs < 0. The pair
    // is not stored and the run still converges.
    for condition in [
        LineSearchCondition::Armijo,
        LineSearchCondition::Wolfe,
        LineSearchCondition::StrongWolfe,
    ] {
        let config = LBFGSConfig::new().with_line_search_condition(condition);
        let mut solver = LBFGS::new(config).unwrap();
        let mut x = DVector::<f64>::from_vec(vec![-1.2, 1.0]);

        let result = solver.minimize(&mut Rosenbrock, &mut x).unwrap();

        assert_eq!(result.termination_reason, TerminationReason::Converged, "{condition:?}");
        assert!(result.value < 1e-10, "{condition:?}: {}", result.value);
        assert!(result.iterations < 100, "{condition:?}");
        assert_relative_eq!(x, DVector::from_element(2, 1.0), epsilon = 1e-4);
    }
}

#[test]
fn test_descent_direction_on_nonconvex_problem() {
    // Every line search checks dot(grad, drt) < 0, so a completed run means
    // each direction was a descent direction.
    let mut solver = LBFGS::new(LBFGSConfig::new().with_memory_size(3)).unwrap();
    for start in [[-1.2, 1.0], [2.0, -1.5], [-0.5, 2.5], [1.5, 0.0]] {
        let mut x = DVector::<f64>::from_vec(start.to_vec());
        let result = solver.minimize(&mut Rosenbrock, &mut x);
        assert!(result.is_ok(), "start {start:?}: {result:?}");
    }
}

#[test]
fn test_memory_sizes() {
    for m in [1, 3, 6, 20] {
        let mut solver = LBFGS::new(LBFGSConfig::new().with_memory_size(m)).unwrap();
        let mut f = ShiftedQuadratic::<f64>::new(6);
        let mut x = DVector::zeros(6);
        let result = solver.minimize(&mut f, &mut x).unwrap();
        assert!(result.converged, "m = {m}");
        assert!(result.value < 1e-6, "m = {m}");
    }
}

#[test]
fn test_max_iterations() {
    let config = LBFGSConfig::new().with_max_iterations(5);
    let mut solver = LBFGS::new(config).unwrap();
    let mut x = DVector::<f64>::zeros(10);

    let result = solver.minimize(&mut Rosenbrock, &mut x).unwrap();
    assert_eq!(result.iterations, 5);
    assert_eq!(result.termination_reason, TerminationReason::MaxIterations);
    assert!(!result.converged);
}

#[test]
fn test_monitor_called_every_iteration_and_on_exit() {
    let mut solver = LBFGS::new(LBFGSConfig::new()).unwrap();
    let mut f = ShiftedQuadratic::<f64>::new(10);
    let mut x = DVector::zeros(10);
    let mut monitor = RecordingMonitor::new();

    let result = solver.minimize_with_monitor(&mut f, &mut x, &mut monitor).unwrap();

    let trace = monitor.trace();
    assert_eq!(trace.len(), result.iterations + 1);
    for (i, &(k, _)) in trace.iter().take(result.iterations).enumerate() {
        assert_eq!(k, i + 1);
    }
    let &(last_k, last_fx) = trace.last().unwrap();
    assert_eq!(last_k, result.iterations);
    assert_eq!(last_fx, result.value);
}

#[test]
fn test_monitor_requests_stop() {
    let mut solver = LBFGS::new(LBFGSConfig::new()).unwrap();
    let mut x = DVector::<f64>::zeros(10);
    let mut monitor = RecordingMonitor::stopping_after(3);

    let result = solver
        .minimize_with_monitor(&mut Rosenbrock, &mut x, &mut monitor)
        .unwrap();

    assert_eq!(result.termination_reason, TerminationReason::UserTerminated);
    assert_eq!(result.iterations, 3);
    // Three loop checks plus the final call.
    assert_eq!(monitor.trace().len(), 4);
    assert!(result.value > 0.0);
}

#[test]
fn test_relative_decrease_and_curvature_breakdown() {
    // f(x) = 100 + x has a constant gradient: the first step is accepted
    // with f = 99 and the resulting pair has y = 0.
    let linear = |x: &DVector<f64>, g: &mut DVector<f64>| {
        g[0] = 1.0;
        100.0 + x[0]
    };

    let mut solver = LBFGS::new(LBFGSConfig::new().with_relative_decrease(1, 0.05)).unwrap();
    let mut f = linear;
    let mut x = DVector::zeros(1);
    let result = solver.minimize(&mut f, &mut x).unwrap();
    assert_eq!(result.termination_reason, TerminationReason::FunctionTolerance);
    assert_eq!(result.iterations, 1);
    assert_relative_eq!(result.value, 99.0);

    // (100 - 99) / 99 is above 0.005, so the run reaches the history update.
    let mut solver = LBFGS::new(LBFGSConfig::new().with_relative_decrease(1, 0.005)).unwrap();
    let mut f = linear;
    let mut x = DVector::zeros(1);
    let result = solver.minimize(&mut f, &mut x).unwrap();
    assert_eq!(result.termination_reason, TerminationReason::CurvatureBreakdown);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.function_evaluations, 2);
    assert_relative_eq!(x[0], -1.0);
}

#[test]
fn test_line_search_failure_propagates() {
    let mut calls = 0;
    let mut f = |x: &DVector<f64>, g: &mut DVector<f64>| {
        calls += 1;
        if calls == 1 {
            g.copy_from(x);
            g.add_scalar_mut(1.0);
            1.0
        } else {
            f64::NAN
        }
    };

    let mut solver = LBFGS::new(LBFGSConfig::new()).unwrap();
    let mut x = DVector::zeros(3);
    let err = solver.minimize(&mut f, &mut x).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LineSearchDivergence);
    match err {
        OptimizerError::LineSearchFailed {
            reason, iterations, ..
        } => {
            assert_eq!(reason, LineSearchFailure::MaxIterations);
            assert_eq!(iterations, 20);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_step_bounds_failure() {
    let params = LineSearchParams::new().with_step_bounds(1e-3, 1e20);
    let mut solver = LBFGS::new(LBFGSConfig::new().with_line_search(params)).unwrap();
    // Every trial value is NaN, so the step shrinks until it leaves the bounds.
    let mut calls = 0;
    let mut f = |_: &DVector<f64>, g: &mut DVector<f64>| {
        calls += 1;
        g.fill(1.0);
        if calls == 1 {
            0.0
        } else {
            f64::NAN
        }
    };
    let mut x = DVector::zeros(4);

    let err = solver.minimize(&mut f, &mut x).unwrap_err();
    match err {
        OptimizerError::LineSearchFailed { reason, .. } => {
            assert_eq!(reason, LineSearchFailure::StepTooSmall);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_reuse_of_solver_instance() {
    let mut solver = LBFGS::new(LBFGSConfig::new()).unwrap();

    let mut x = DVector::<f64>::zeros(10);
    let first = solver.minimize(&mut Rosenbrock, &mut x).unwrap();

    // A different dimension in between must not leak into the next run.
    let mut small = DVector::from_element(4, 2.0);
    solver.minimize(&mut ShiftedQuadratic::<f64>::new(4), &mut small).unwrap();

    let mut y = DVector::<f64>::zeros(10);
    let second = solver.minimize(&mut Rosenbrock, &mut y).unwrap();

    assert_eq!(first, second);
    assert_eq!(x, y);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_fresh_state_idempotence(start in prop::collection::vec(-2.0f64..2.0, 4)) {
        let config = LBFGSConfig::new().with_max_iterations(200);
        let mut shared = LBFGS::new(config.clone()).unwrap();
        let mut fresh = LBFGS::new(config).unwrap();

        let mut x1 = DVector::from_vec(start.clone());
        let mut x2 = DVector::from_vec(start.clone());
        let mut x3 = DVector::from_vec(start);

        let r1 = shared.minimize(&mut Rosenbrock, &mut x1);
        let r2 = shared.minimize(&mut Rosenbrock, &mut x2);
        let r3 = fresh.minimize(&mut Rosenbrock, &mut x3);

        match (r1, r2, r3) {
            (Ok(a), Ok(b), Ok(c)) => {
                prop_assert_eq!(&a, &b);
                prop_assert_eq!(&a, &c);
            }
            (Err(a), Err(b), Err(c)) => {
                prop_assert_eq!(a.to_string(), b.to_string());
                prop_assert_eq!(a.to_string(), c.to_string());
            }
            _ => prop_assert!(false, "runs diverged"),
        }
        prop_assert_eq!(&x1, &x2);
        prop_assert_eq!(&x1, &x3);
    }

    #[test]
    fn prop_quadratic_converges_from_any_start(
        start in prop::collection::vec(-50.0f64..50.0, 6),
        memory in 1usize..10,
    ) {
        let mut solver = LBFGS::new(LBFGSConfig::new().with_memory_size(memory)).unwrap();
        let mut f = ShiftedQuadratic::<f64>::new(6);
        let mut x = DVector::from_vec(start);

        let result = solver.minimize(&mut f, &mut x).unwrap();
        prop_assert!(result.converged);
        prop_assert!(result.value < 1e-6);
    }
}
