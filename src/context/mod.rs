//! Context module for kryst-monitor.
//!
//! This module provides the factory type that pairs a Krylov solver with a stop
//! monitor built from [`StopOptions`](crate::config::StopOptions).
//!
//! Modules:
//! - [`ksp_context`]: Contains the `KspContext` struct for solver selection and monitor configuration.
//!
//! # Example
//! ```rust,ignore
//! use kryst_monitor::context::{KspContext, SolverKind};
//! let mut ksp = KspContext::new(SolverKind::Cg, a);
//! let stats = ksp.solve_context(&b, &mut x)?;
//! ```
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems. SIAM.
//! - PETSc documentation: https://petsc.org/release/docs/manualpages/KSP/

pub mod ksp_context;
pub use ksp_context::{KspContext, SolverKind};
