//! Reference Krylov solvers driven by a stop-criterion monitor.
//!
//! Each solver owns a [`CompositeEvaluator`](crate::monitor::CompositeEvaluator); the
//! iteration loop runs until the monitor reports a terminal status.

use crate::utils::convergence::SolveStats;

/// Common interface for any iterative solver.
pub trait LinearSolver<M, V> {
    type Error;
    type Scalar;
    /// Solve A·x = b, writing result into `x`.
    /// Returns iteration stats (including the monitor's final status).
    fn solve(&mut self, a: &M, b: &V, x: &mut V) -> Result<SolveStats<Self::Scalar>, Self::Error>;
}

pub mod cg;
pub use cg::CgSolver;

pub mod bicgstab;
pub use bicgstab::BiCgStabSolver;
