//! Shared status and statistics types.

pub mod convergence;

pub use convergence::{CalculationStatus, SolveStats};
