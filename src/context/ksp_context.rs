//! Factory for Krylov Subspace Methods (KSP).
//!
//! `KspContext` selects a solver kind, owns the system matrix and the [`StopOptions`]
//! describing when to stop. Every call to [`KspContext::solve_context`] builds a fresh
//! monitor from the options, so independent contexts never share stop-criterion history.
//! The monitor of the most recent solve is kept for inspection.
//!
//! # Supported Solvers
//! - CG, BiCGStab
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems. SIAM.
//! - Templates for the Solution of Linear Systems: Building Blocks for Iterative Methods, 2nd Edition (Barrett et al.)

use log::debug;
use num_traits::Float;

use crate::config::options::StopOptions;
use crate::core::traits::{MatVec, Scalar};
use crate::error::KError;
use crate::monitor::CompositeEvaluator;
use crate::solver::{BiCgStabSolver, CgSolver, LinearSolver};
use crate::utils::convergence::SolveStats;

/// Enum representing the available Krylov solver types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    /// Conjugate Gradient (CG) method (for SPD matrices)
    Cg,
    /// BiConjugate Gradient Stabilized (BiCGStab)
    Bicgstab,
}

/// Context and configuration for a Krylov subspace solver.
pub struct KspContext<M, T: Scalar> {
    /// The type of Krylov solver to use
    pub kind: SolverKind,
    /// The system matrix
    pub a: M,
    /// Stop criteria applied to every solve
    pub options: StopOptions,
    last_monitor: Option<CompositeEvaluator<T>>,
}

impl<M, T> KspContext<M, T>
where
    M: MatVec<Vec<T>>,
    T: Float + Scalar<Real = T>,
{
    pub fn new(kind: SolverKind, a: M) -> Self {
        Self::with_options(kind, a, StopOptions::default())
    }

    pub fn with_options(kind: SolverKind, a: M, options: StopOptions) -> Self {
        Self { kind, a, options, last_monitor: None }
    }

    /// Monitor of the last solve, holding the status and the criterion that ended it.
    pub fn last_monitor(&self) -> Option<&CompositeEvaluator<T>> {
        self.last_monitor.as_ref()
    }

    /// Solve the linear system `Ax = b` using the configured solver and stop options.
    ///
    /// # Returns
    /// * `Ok(SolveStats)` whatever the final status (converged, diverged, cancelled, ...)
    /// * `Err(KError)` on invalid options or a solver breakdown reported as an error
    pub fn solve_context(&mut self, b: &Vec<T>, x: &mut Vec<T>) -> Result<SolveStats<T>, KError> {
        let monitor = self.options.build::<T>()?;
        debug!("solving with {:?} and {} stop criteria", self.kind, monitor.len());
        let (stats, monitor) = match self.kind {
            SolverKind::Cg => {
                let mut solver = CgSolver::with_monitor(monitor);
                let stats = solver.solve(&self.a, b, x)?;
                (stats, solver.monitor)
            }
            SolverKind::Bicgstab => {
                let mut solver = BiCgStabSolver::with_monitor(monitor);
                let stats = solver.solve(&self.a, b, x)?;
                (stats, solver.monitor)
            }
        };
        self.last_monitor = Some(monitor);
        Ok(stats)
    }
}
