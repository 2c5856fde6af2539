//! Tests for monitor-driven iterative solvers (CG, BiCGStab) vs direct solvers on random matrices.
//!
//! This module verifies that the iterative solvers stop with a `Converged` status on
//! well-posed random systems and that their solutions match faer's direct LU/QR solves.
//! It also checks the other ways a solve can end: an exhausted budget and cancellation.

use approx::assert_abs_diff_eq;
use faer::Mat;
use faer::linalg::solvers::SolveCore;
use kryst_monitor::config::StopOptions;
use kryst_monitor::context::{KspContext, SolverKind};
use kryst_monitor::criterion::{CancellationCriterion, IterationBudgetCriterion, ResidualConvergenceCriterion};
use kryst_monitor::monitor::CompositeEvaluator;
use kryst_monitor::solver::{BiCgStabSolver, CgSolver, LinearSolver};
use kryst_monitor::utils::CalculationStatus;
use rand::Rng;

/// Random symmetric positive definite (SPD) matrix `A = Mᵀ M + I` and right-hand side `b`.
fn random_spd(n: usize) -> (faer::Mat<f64>, Vec<f64>) {
    let mut rng = rand::thread_rng();
    let data: Vec<f64> = (0..n * n).map(|_| rng.r#gen()).collect();
    let m = Mat::from_fn(n, n, |i, j| data[j * n + i]);
    let m_t = m.transpose();
    let a = &m_t * &m + Mat::<f64>::identity(n, n);
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    (a, b)
}

/// CG stops with `Converged` and matches the direct LU solution.
#[test]
fn cg_vs_direct_on_spd() {
    let n = 10;
    let (a, b) = random_spd(n);
    let mut x_cg = vec![0.0; n];
    let mut solver = CgSolver::new(1e-10, 1000).unwrap();
    let stats = solver.solve(&a, &b, &mut x_cg).unwrap();
    assert_eq!(stats.status, CalculationStatus::Converged);
    // Direct solve using LU decomposition
    let mut x_direct = b.clone();
    let lus = faer::linalg::solvers::FullPivLu::new(a.as_ref());
    let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x_direct, n, 1);
    lus.solve_in_place_with_conj(faer::Conj::No, x_mat);
    for i in 0..n {
        assert_abs_diff_eq!(x_cg[i], x_direct[i], epsilon = 1e-6);
    }
}

/// BiCGStab on a diagonally dominant non-symmetric system matches the direct QR solution.
#[test]
fn bicgstab_vs_direct_on_nonsymmetric() {
    let n = 10;
    let mut rng = rand::thread_rng();
    let data: Vec<f64> = (0..n * n).map(|_| rng.r#gen()).collect();
    let a = Mat::from_fn(n, n, |i, j| data[j * n + i] + if i == j { n as f64 } else { 0.0 });
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    let mut x_it = vec![0.0; n];
    let mut solver = BiCgStabSolver::new(1e-10, 1000).unwrap();
    let stats = solver.solve(&a, &b, &mut x_it).unwrap();
    assert!(stats.converged, "{stats:?}");
    let mut x_direct = b.clone();
    let qr = faer::linalg::solvers::Qr::new(a.as_ref());
    let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x_direct, n, 1);
    qr.solve_in_place_with_conj(faer::Conj::No, x_mat);
    for i in 0..n {
        assert_abs_diff_eq!(x_it[i], x_direct[i], epsilon = 1e-6);
    }
}

#[test]
fn tiny_budget_stops_without_convergence() {
    let n = 20;
    let (a, b) = random_spd(n);
    let mut ksp = KspContext::with_options(
        SolverKind::Cg,
        a,
        StopOptions { max_iters: 2, rtol: 1e-14, ..StopOptions::default() },
    );
    let mut x = vec![0.0; n];
    let stats = ksp.solve_context(&b, &mut x).unwrap();
    assert_eq!(stats.status, CalculationStatus::IterationLimitReached);
    assert_eq!(stats.iterations, 2);
    assert_eq!(ksp.last_monitor().unwrap().triggered_criterion().unwrap().name(), "iteration-budget");
}

#[test]
fn pre_cancelled_solve_returns_immediately() {
    let (a, b) = random_spd(5);
    let cancel = CancellationCriterion::new();
    cancel.cancel();
    let monitor = CompositeEvaluator::<f64>::new()
        .with(ResidualConvergenceCriterion::new(1e-12_f64).unwrap())
        .with(IterationBudgetCriterion::new(100).unwrap())
        .with(cancel);
    let mut solver = CgSolver::with_monitor(monitor);
    let mut x = vec![0.0; 5];
    let stats = solver.solve(&a, &b, &mut x).unwrap();
    assert_eq!(stats.status, CalculationStatus::Cancelled);
    assert_eq!(stats.iterations, 0);
    assert!(x.iter().all(|&xi| xi == 0.0));
}
