//! kryst-monitor: stop criteria and convergence monitoring for Krylov solvers
//!
//! After every iteration of an iterative linear solver, a [`CompositeEvaluator`] asks each
//! of its [`StopCriterion`] members (iteration budget, residual convergence, divergence,
//! cancellation, numerical failure) for a verdict and reduces them to one
//! [`CalculationStatus`] with a fixed precedence. Criteria keep private history, can be
//! reset between solves and cloned (configuration only) for independent solves.
//!
//! Reference CG and BiCGStab solvers driven by the monitor are included.

pub mod config;
pub mod context;
pub mod core;
pub mod criterion;
pub mod error;
pub mod monitor;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use crate::config::*;
pub use crate::context::*;
pub use crate::core::*;
pub use crate::criterion::*;
pub use crate::error::*;
pub use crate::monitor::*;
pub use crate::solver::*;
pub use crate::utils::*;
